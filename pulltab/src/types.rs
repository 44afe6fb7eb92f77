//! Domain types for the pull-tab engine.
//!
//! Value objects (identifiers, [`Coins`], [`TabValue`]), entities
//! ([`PullTabDesign`], [`PullTabTicket`], [`Wallet`], [`LedgerEntry`]) and the
//! player-facing [`TicketView`].

use crate::error::PullTabError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Largest number of tabs a design may print on one ticket.
pub const MAX_TAB_COUNT: usize = 50;

/// JSON marker for a losing tab.
const LOSS_MARKER: &str = "LOSS";

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for a player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Creates a new random `PlayerId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `PlayerId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a pull-tab design
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DesignId(Uuid);

impl DesignId {
    /// Creates a new random `DesignId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `DesignId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for DesignId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DesignId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a purchased ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Creates a new random `TicketId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a `TicketId` from a `Uuid`
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Coins
// ============================================================================

/// A non-negative coin amount.
///
/// Arithmetic is checked; callers decide what an overflow means.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Coins(u64);

impl Coins {
    /// Zero coins
    pub const ZERO: Self = Self(0);

    /// Creates a `Coins` value
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Returns the raw amount
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts with overflow checking
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Subtracts two amounts (returns None if result would be negative)
    #[must_use]
    pub const fn checked_sub(self, other: Self) -> Option<Self> {
        match self.0.checked_sub(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Converts to the signed representation used by `BIGINT` columns
    ///
    /// # Errors
    ///
    /// Returns [`PullTabError::BalanceOverflow`] above `i64::MAX`.
    pub fn to_i64(self) -> Result<i64, PullTabError> {
        i64::try_from(self.0).map_err(|_| PullTabError::BalanceOverflow)
    }

    /// Converts from a `BIGINT` column value
    ///
    /// Returns `None` for negative values.
    #[must_use]
    pub fn from_i64(value: i64) -> Option<Self> {
        u64::try_from(value).ok().map(Self)
    }
}

impl fmt::Display for Coins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tabs
// ============================================================================

/// Outcome printed under a single tab.
///
/// Serialized as the prize amount, or the string `"LOSS"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TabValue {
    /// Nothing under this tab
    Loss,
    /// A prize of the given amount
    Prize(Coins),
}

impl TabValue {
    /// Returns the prize, if this tab wins
    #[must_use]
    pub const fn prize(&self) -> Option<Coins> {
        match self {
            Self::Loss => None,
            Self::Prize(amount) => Some(*amount),
        }
    }

    /// Returns true if this tab wins
    #[must_use]
    pub const fn is_winner(&self) -> bool {
        matches!(self, Self::Prize(_))
    }
}

impl Serialize for TabValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Loss => serializer.serialize_str(LOSS_MARKER),
            Self::Prize(amount) => serializer.serialize_u64(amount.amount()),
        }
    }
}

impl<'de> Deserialize<'de> for TabValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Amount(u64),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Amount(amount) => Ok(Self::Prize(Coins::new(amount))),
            Raw::Marker(marker) if marker == LOSS_MARKER => Ok(Self::Loss),
            Raw::Marker(other) => Err(serde::de::Error::custom(format!(
                "expected a prize amount or \"{LOSS_MARKER}\", found \"{other}\""
            ))),
        }
    }
}

/// A single tab on a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    /// Position on the ticket, `0..tab_count`
    pub index: usize,
    /// What is printed under the tab
    pub value: TabValue,
    /// Whether the player has pulled this tab
    pub revealed: bool,
}

impl Tab {
    /// An unrevealed losing tab
    #[must_use]
    pub const fn loss(index: usize) -> Self {
        Self {
            index,
            value: TabValue::Loss,
            revealed: false,
        }
    }

    /// An unrevealed winning tab
    #[must_use]
    pub const fn prize(index: usize, amount: Coins) -> Self {
        Self {
            index,
            value: TabValue::Prize(amount),
            revealed: false,
        }
    }
}

// ============================================================================
// Designs
// ============================================================================

/// Admin-editable settings of a design.
///
/// Used both to create a design and to replace the settings of an existing one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DesignSpec {
    /// Display name
    pub name: String,
    /// Price of one ticket
    pub cost: Coins,
    /// Number of tabs per ticket
    pub tab_count: usize,
    /// Probability that a ticket contains a winning tab
    pub win_probability: f64,
    /// Smallest prize (inclusive)
    pub min_prize: Coins,
    /// Largest prize (inclusive)
    pub max_prize: Coins,
}

impl DesignSpec {
    /// Validate the settings
    ///
    /// # Errors
    ///
    /// Returns [`PullTabError::InvalidDesign`] describing the first problem found.
    pub fn validate(&self) -> Result<(), PullTabError> {
        let invalid = |reason: &str| Err(PullTabError::InvalidDesign(reason.to_string()));

        if self.name.trim().is_empty() {
            return invalid("name cannot be empty");
        }
        if self.cost.is_zero() {
            return invalid("cost must be greater than zero");
        }
        if self.tab_count == 0 || self.tab_count > MAX_TAB_COUNT {
            return Err(PullTabError::InvalidDesign(format!(
                "tab_count must be between 1 and {MAX_TAB_COUNT}"
            )));
        }
        if !self.win_probability.is_finite() || !(0.0..=1.0).contains(&self.win_probability) {
            return invalid("win_probability must be between 0 and 1");
        }
        if self.min_prize.is_zero() {
            return invalid("min_prize must be greater than zero");
        }
        if self.min_prize > self.max_prize {
            return invalid("min_prize cannot exceed max_prize");
        }
        if self.cost.to_i64().is_err() || self.max_prize.to_i64().is_err() {
            return invalid("amounts exceed the supported range");
        }
        Ok(())
    }
}

/// A pull-tab design: the configuration every ticket is printed from
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PullTabDesign {
    /// Design identifier
    pub id: DesignId,
    /// Display name
    pub name: String,
    /// Price of one ticket
    pub cost: Coins,
    /// Number of tabs per ticket
    pub tab_count: usize,
    /// Probability that a ticket contains a winning tab
    pub win_probability: f64,
    /// Smallest prize (inclusive)
    pub min_prize: Coins,
    /// Largest prize (inclusive)
    pub max_prize: Coins,
    /// Only active designs can be purchased
    pub active: bool,
    /// When the design was created
    pub created_at: DateTime<Utc>,
    /// When the design was last changed
    pub updated_at: DateTime<Utc>,
}

impl PullTabDesign {
    /// Build a new, active design from validated settings
    #[must_use]
    pub fn from_spec(id: DesignId, spec: DesignSpec, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: spec.name,
            cost: spec.cost,
            tab_count: spec.tab_count,
            win_probability: spec.win_probability,
            min_prize: spec.min_prize,
            max_prize: spec.max_prize,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// The admin-editable part of this design
    #[must_use]
    pub fn spec(&self) -> DesignSpec {
        DesignSpec {
            name: self.name.clone(),
            cost: self.cost,
            tab_count: self.tab_count,
            win_probability: self.win_probability,
            min_prize: self.min_prize,
            max_prize: self.max_prize,
        }
    }

    /// Replace the editable settings
    pub fn apply_spec(&mut self, spec: DesignSpec, now: DateTime<Utc>) {
        self.name = spec.name;
        self.cost = spec.cost;
        self.tab_count = spec.tab_count;
        self.win_probability = spec.win_probability;
        self.min_prize = spec.min_prize;
        self.max_prize = spec.max_prize;
        self.updated_at = now;
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// Lifecycle status of a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Purchased and still playable
    Active,
    /// Lifetime elapsed; can no longer be revealed or claimed
    Expired,
    /// Prize paid out
    Claimed,
}

impl TicketStatus {
    /// Convert status to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Claimed => "claimed",
        }
    }

    /// Parse status from database string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(Self::Active),
            "expired" => Some(Self::Expired),
            "claimed" => Some(Self::Claimed),
            _ => None,
        }
    }
}

/// Claim status of a ticket
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Nothing has been claimed yet
    Unclaimed,
    /// The prize has been paid out
    Claimed,
    /// Every tab is revealed and none wins
    NoPrize,
}

impl ClaimStatus {
    /// Convert status to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unclaimed => "unclaimed",
            Self::Claimed => "claimed",
            Self::NoPrize => "no_prize",
        }
    }

    /// Parse status from database string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "unclaimed" => Some(Self::Unclaimed),
            "claimed" => Some(Self::Claimed),
            "no_prize" => Some(Self::NoPrize),
            _ => None,
        }
    }
}

/// A purchased ticket with its full (server-side) outcome
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullTabTicket {
    /// Ticket identifier
    pub id: TicketId,
    /// Owner
    pub player_id: PlayerId,
    /// Design the ticket was printed from
    pub design_id: DesignId,
    /// Price paid, snapshotted at purchase
    pub cost: Coins,
    /// Tabs in index order
    pub tabs: Vec<Tab>,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Claim status
    pub claim_status: ClaimStatus,
    /// When the ticket was bought
    pub purchased_at: DateTime<Utc>,
    /// When the ticket stops being playable
    pub expires_at: DateTime<Utc>,
    /// When the prize was claimed
    pub claimed_at: Option<DateTime<Utc>>,
    /// When the ticket was expired
    pub expired_at: Option<DateTime<Utc>>,
}

impl PullTabTicket {
    /// The winning tab, if the ticket has one
    #[must_use]
    pub fn winning_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|tab| tab.value.is_winner())
    }

    /// The prize printed on this ticket, if any
    #[must_use]
    pub fn prize(&self) -> Option<Coins> {
        self.winning_tab().and_then(|tab| tab.value.prize())
    }

    /// Number of tabs not yet revealed
    #[must_use]
    pub fn hidden_count(&self) -> usize {
        self.tabs.iter().filter(|tab| !tab.revealed).count()
    }

    /// Returns true once every tab is revealed
    #[must_use]
    pub fn is_fully_revealed(&self) -> bool {
        self.hidden_count() == 0
    }

    /// Returns true if `now` is at or past the ticket's expiry
    #[must_use]
    pub fn is_past_expiry(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Player-facing projection with hidden values masked
    #[must_use]
    pub fn view(&self) -> TicketView {
        let prize_known = self.claim_status == ClaimStatus::Claimed
            || self.winning_tab().is_some_and(|tab| tab.revealed);

        TicketView {
            id: self.id,
            design_id: self.design_id,
            cost: self.cost,
            tabs: self
                .tabs
                .iter()
                .map(|tab| TabView {
                    index: tab.index,
                    revealed: tab.revealed,
                    value: tab.revealed.then_some(tab.value),
                })
                .collect(),
            status: self.status,
            claim_status: self.claim_status,
            prize: if prize_known { self.prize() } else { None },
            purchased_at: self.purchased_at,
            expires_at: self.expires_at,
            claimed_at: self.claimed_at,
        }
    }
}

/// A tab as the player sees it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabView {
    /// Position on the ticket
    pub index: usize,
    /// Whether the tab has been pulled
    pub revealed: bool,
    /// The printed value, only once revealed
    pub value: Option<TabValue>,
}

/// A ticket as the player sees it
///
/// Unrevealed values never leave the server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketView {
    /// Ticket identifier
    pub id: TicketId,
    /// Design the ticket was printed from
    pub design_id: DesignId,
    /// Price paid
    pub cost: Coins,
    /// Tabs in index order
    pub tabs: Vec<TabView>,
    /// Lifecycle status
    pub status: TicketStatus,
    /// Claim status
    pub claim_status: ClaimStatus,
    /// Prize amount, once the winning tab is revealed
    pub prize: Option<Coins>,
    /// When the ticket was bought
    pub purchased_at: DateTime<Utc>,
    /// When the ticket stops being playable
    pub expires_at: DateTime<Utc>,
    /// When the prize was claimed
    pub claimed_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Wallets and ledger
// ============================================================================

/// A player's coin balance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    /// Owner
    pub player_id: PlayerId,
    /// Current balance
    pub balance: Coins,
}

impl Wallet {
    /// A wallet with zero balance
    #[must_use]
    pub const fn empty(player_id: PlayerId) -> Self {
        Self {
            player_id,
            balance: Coins::ZERO,
        }
    }
}

/// Why a ledger entry was written
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerKind {
    /// Ticket cost debited
    TicketPurchase,
    /// Prize credited
    PrizePayout,
    /// Coins granted by an operator
    AdminCredit,
}

impl LedgerKind {
    /// Convert kind to database string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TicketPurchase => "ticket_purchase",
            Self::PrizePayout => "prize_payout",
            Self::AdminCredit => "admin_credit",
        }
    }

    /// Parse kind from database string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ticket_purchase" => Some(Self::TicketPurchase),
            "prize_payout" => Some(Self::PrizePayout),
            "admin_credit" => Some(Self::AdminCredit),
            _ => None,
        }
    }
}

/// A balance movement that has not been written yet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLedgerEntry {
    /// Wallet owner
    pub player_id: PlayerId,
    /// Ticket that caused the movement
    pub ticket_id: Option<TicketId>,
    /// Why the balance moved
    pub kind: LedgerKind,
    /// Signed change (negative for debits)
    pub amount: i64,
    /// Balance after the movement
    pub balance_after: Coins,
    /// When the movement happened
    pub created_at: DateTime<Utc>,
}

/// A recorded balance movement
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Sequence number
    pub id: i64,
    /// Wallet owner
    pub player_id: PlayerId,
    /// Ticket that caused the movement
    pub ticket_id: Option<TicketId>,
    /// Why the balance moved
    pub kind: LedgerKind,
    /// Signed change (negative for debits)
    pub amount: i64,
    /// Balance after the movement
    pub balance_after: Coins,
    /// When the movement happened
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spec() -> DesignSpec {
        DesignSpec {
            name: "Lucky Sevens".to_string(),
            cost: Coins::new(10),
            tab_count: 5,
            win_probability: 0.25,
            min_prize: Coins::new(5),
            max_prize: Coins::new(100),
        }
    }

    fn ticket(tabs: Vec<Tab>) -> PullTabTicket {
        let now = Utc::now();
        PullTabTicket {
            id: TicketId::new(),
            player_id: PlayerId::new(),
            design_id: DesignId::new(),
            cost: Coins::new(10),
            tabs,
            status: TicketStatus::Active,
            claim_status: ClaimStatus::Unclaimed,
            purchased_at: now,
            expires_at: now + chrono::Duration::hours(1),
            claimed_at: None,
            expired_at: None,
        }
    }

    #[test]
    fn test_tab_value_json_shape() {
        assert_eq!(serde_json::to_value(TabValue::Loss).unwrap(), serde_json::json!("LOSS"));
        assert_eq!(
            serde_json::to_value(TabValue::Prize(Coins::new(25))).unwrap(),
            serde_json::json!(25)
        );
        assert_eq!(
            serde_json::from_value::<TabValue>(serde_json::json!("LOSS")).unwrap(),
            TabValue::Loss
        );
        assert_eq!(
            serde_json::from_value::<TabValue>(serde_json::json!(40)).unwrap(),
            TabValue::Prize(Coins::new(40))
        );
    }

    #[test]
    fn test_tab_value_rejects_unknown_marker() {
        assert!(serde_json::from_value::<TabValue>(serde_json::json!("WIN")).is_err());
        assert!(serde_json::from_value::<TabValue>(serde_json::json!(-3)).is_err());
    }

    #[test]
    fn test_tab_json_shape() {
        let json = serde_json::to_value(Tab::prize(2, Coins::new(50))).unwrap();
        assert_eq!(json, serde_json::json!({"index": 2, "value": 50, "revealed": false}));
    }

    #[test]
    fn test_valid_spec() {
        assert!(spec().validate().is_ok());
    }

    #[test]
    fn test_invalid_specs() {
        let cases: Vec<(&str, Box<dyn Fn(&mut DesignSpec)>)> = vec![
            ("blank name", Box::new(|s| s.name = "  ".to_string())),
            ("zero cost", Box::new(|s| s.cost = Coins::ZERO)),
            ("no tabs", Box::new(|s| s.tab_count = 0)),
            ("too many tabs", Box::new(|s| s.tab_count = MAX_TAB_COUNT + 1)),
            ("negative probability", Box::new(|s| s.win_probability = -0.1)),
            ("probability above one", Box::new(|s| s.win_probability = 1.5)),
            ("nan probability", Box::new(|s| s.win_probability = f64::NAN)),
            ("zero min prize", Box::new(|s| s.min_prize = Coins::ZERO)),
            ("inverted range", Box::new(|s| s.min_prize = Coins::new(500))),
            ("unrepresentable prize", Box::new(|s| s.max_prize = Coins::new(u64::MAX))),
        ];

        for (label, mutate) in cases {
            let mut candidate = spec();
            mutate(&mut candidate);
            assert!(
                matches!(candidate.validate(), Err(PullTabError::InvalidDesign(_))),
                "{label} should be rejected"
            );
        }
    }

    #[test]
    fn test_coins_checked_arithmetic() {
        assert_eq!(Coins::new(5).checked_sub(Coins::new(6)), None);
        assert_eq!(Coins::new(u64::MAX).checked_add(Coins::new(1)), None);
        assert_eq!(Coins::new(7).checked_add(Coins::new(3)), Some(Coins::new(10)));
        assert!(Coins::new(u64::MAX).to_i64().is_err());
        assert_eq!(Coins::from_i64(-1), None);
    }

    #[test]
    fn test_view_masks_hidden_values() {
        let mut t = ticket(vec![Tab::loss(0), Tab::prize(1, Coins::new(30)), Tab::loss(2)]);
        t.tabs[0].revealed = true;

        let view = t.view();
        assert_eq!(view.tabs[0].value, Some(TabValue::Loss));
        assert_eq!(view.tabs[1].value, None);
        assert_eq!(view.tabs[2].value, None);
        assert_eq!(view.prize, None);

        t.tabs[1].revealed = true;
        assert_eq!(t.view().prize, Some(Coins::new(30)));
    }

    #[test]
    fn test_ticket_helpers() {
        let mut t = ticket(vec![Tab::loss(0), Tab::loss(1)]);
        assert_eq!(t.prize(), None);
        assert_eq!(t.hidden_count(), 2);
        t.tabs.iter_mut().for_each(|tab| tab.revealed = true);
        assert!(t.is_fully_revealed());
        assert!(t.is_past_expiry(t.expires_at));
        assert!(!t.is_past_expiry(t.purchased_at));
    }

    #[test]
    fn test_status_round_trip_strings() {
        for status in [TicketStatus::Active, TicketStatus::Expired, TicketStatus::Claimed] {
            assert_eq!(TicketStatus::parse(status.as_str()), Some(status));
        }
        for status in [ClaimStatus::Unclaimed, ClaimStatus::Claimed, ClaimStatus::NoPrize] {
            assert_eq!(ClaimStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LedgerKind::parse("refund"), None);
    }
}

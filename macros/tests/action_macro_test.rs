//! Tests for #[derive(Action)] macro

use chrono::{DateTime, Utc};
use pulltab_macros::Action;

#[derive(Action, Clone, Debug, PartialEq)]
enum TabAction {
    #[command]
    Reveal {
        tab_index: usize,
    },

    #[command]
    Claim,

    #[command]
    Expire(DateTime<Utc>),

    #[event]
    Revealed {
        tab_index: usize,
        at: DateTime<Utc>,
    },

    #[event]
    Claimed {
        amount: u64,
    },

    #[event]
    Expired(DateTime<Utc>),

    Rejected {
        reason: String,
    },
}

#[test]
fn test_is_command() {
    let action = TabAction::Reveal { tab_index: 2 };
    assert!(action.is_command());
    assert!(!action.is_event());
}

#[test]
fn test_is_event() {
    let action = TabAction::Revealed {
        tab_index: 2,
        at: Utc::now(),
    };
    assert!(!action.is_command());
    assert!(action.is_event());
}

#[test]
fn test_event_type() {
    assert_eq!(TabAction::Claimed { amount: 50 }.event_type(), "Claimed.v1");
    assert_eq!(TabAction::Expired(Utc::now()).event_type(), "Expired.v1");
}

#[test]
fn test_command_event_type() {
    // Commands don't have event types
    assert_eq!(TabAction::Claim.event_type(), "unknown");
}

#[test]
fn test_unmarked_variant_is_neither() {
    let action = TabAction::Rejected {
        reason: "nope".to_string(),
    };
    assert!(!action.is_command());
    assert!(!action.is_event());
    assert_eq!(action.event_type(), "unknown");
}

#[test]
fn test_variant_names() {
    let cases = vec![
        (TabAction::Reveal { tab_index: 0 }, "Reveal"),
        (TabAction::Claim, "Claim"),
        (TabAction::Expire(Utc::now()), "Expire"),
        (TabAction::Claimed { amount: 1 }, "Claimed"),
        (
            TabAction::Rejected {
                reason: String::new(),
            },
            "Rejected",
        ),
    ];

    for (action, expected) in cases {
        assert_eq!(action.variant_name(), expected);
    }
}

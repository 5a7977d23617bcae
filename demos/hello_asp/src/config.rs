//! Configuration schema for the demo.

use std::time::Duration;

use asp::Schema;

/// Options for the greeting.
#[derive(Schema, Debug, Clone, Default, PartialEq, Eq)]
pub struct HelloConfig {
    /// Who to greet.
    #[asp(short = "r", desc = "who to greet")]
    pub recipient: String,
    /// Words placed before the recipient.
    #[asp("salutations,s,,greeting words placed before the {Name|words}")]
    pub salutations: Vec<String>,
    /// End with an exclamation mark.
    #[asp(short = "x")]
    pub excited: bool,
    /// Pause before greeting.
    pub delay: Duration,
    /// Where the greeting goes.
    pub delivery: Delivery,
}

/// Delivery settings, exposed as `--delivery-*` flags.
#[derive(Schema, Debug, Clone, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Token for the delivery service.
    #[asp(sensitive)]
    pub token: String,
    /// Attempts before giving up.
    pub retries: u64,
}

impl HelloConfig {
    /// Built-in defaults shown in `--help`.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            recipient: "World".into(),
            salutations: vec!["Hello".into()],
            delivery: Delivery {
                retries: 3,
                ..Delivery::default()
            },
            ..Self::default()
        }
    }
}

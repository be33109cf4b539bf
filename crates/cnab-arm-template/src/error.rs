/// Which bundle section a key came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
    Parameter,
    Credential,
}

impl std::fmt::Display for SettingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parameter => f.write_str("parameter"),
            Self::Credential => f.write_str("credential"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error(
        "invalid {kind} name {key:?}: template generation requires {kind} names that can be used as environment variables (no '-')"
    )]
    InvalidName { kind: SettingKind, key: String },

    #[error("parameter {key:?} references undefined definition {definition:?}")]
    UndefinedDefinition { key: String, definition: String },

    #[error("{bound} of parameter {key:?} cannot be normalized to an inclusive integer bound")]
    BoundOverflow { key: String, bound: &'static str },

    // ── Identity ──
    #[error(
        "cannot get bundle name from invocation images; no docker image in: {}",
        format_images(images)
    )]
    MissingInvocationImage { images: Vec<String> },

    #[error("cannot parse invocation image reference {reference:?}: {reason}")]
    InvalidImageReference {
        reference: String,
        reason: &'static str,
    },

    #[error("template scaffold has no worker container")]
    MissingContainer,

    #[error("failed to serialize template")]
    Serialize { source: serde_json::Error },
}

fn format_images(images: &[String]) -> String {
    if images.is_empty() {
        "(none)".to_owned()
    } else {
        images.join(", ")
    }
}

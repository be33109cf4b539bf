//! Bundle identity derived from the docker invocation image.
//!
//! Image references follow the docker distribution grammar:
//!
//! ```text
//! reference := name [ ":" tag ] [ "@" digest ]
//! name      := [domain "/"] path-component ["/" path-component]*
//! ```
//!
//! Only canonical references are accepted, i.e. the registry domain must be
//! spelled out. `widget:1.0` is ambiguous (it would normalize to
//! `docker.io/library/widget`) and is rejected.

use std::sync::LazyLock;

use cnab_arm_core::Bundle;
use regex::Regex;

use crate::CompileError;

const NAME_TOTAL_LENGTH_MAX: usize = 255;

static REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    let path_component = r"[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*";
    let domain_component = r"(?:[a-zA-Z0-9]|[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9])";
    let domain = format!(r"{domain_component}(?:\.{domain_component})*(?::[0-9]+)?");
    let name = format!(r"(?:{domain}/)?{path_component}(?:/{path_component})*");
    let tag = r"[A-Za-z0-9_][A-Za-z0-9_.-]{0,127}";
    let digest = r"[A-Za-z][A-Za-z0-9]*(?:[-_+.][A-Za-z][A-Za-z0-9]*)*:[0-9A-Fa-f]{32,}";
    Regex::new(&format!(r"^({name})(?::({tag}))?(?:@({digest}))?$"))
        .expect("image reference grammar is a valid regex")
});

/// A parsed, canonical image reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// `domain/path`, without tag or digest.
    pub name: String,
    pub tag: Option<String>,
    pub digest: Option<String>,
}

impl ImageReference {
    pub fn parse(reference: &str) -> Result<Self, CompileError> {
        let invalid = |reason| CompileError::InvalidImageReference {
            reference: reference.to_owned(),
            reason,
        };

        if reference.is_empty() {
            return Err(invalid("empty reference"));
        }

        let captures = REFERENCE
            .captures(reference)
            .ok_or_else(|| invalid("invalid reference format"))?;

        let name = captures
            .get(1)
            .map(|m| m.as_str().to_owned())
            .ok_or_else(|| invalid("invalid reference format"))?;
        if name.len() > NAME_TOTAL_LENGTH_MAX {
            return Err(invalid("repository name must not be more than 255 characters"));
        }

        let (domain, path) = split_domain(&name);
        match domain {
            None => return Err(invalid("repository name must be canonical (include the registry)")),
            Some("index.docker.io") => {
                return Err(invalid(
                    "repository name must be canonical (use docker.io instead of index.docker.io)",
                ));
            }
            Some("docker.io") if !path.contains('/') => {
                return Err(invalid(
                    "repository name must be canonical (docker.io images need a namespace)",
                ));
            }
            Some(_) => {}
        }

        Ok(Self {
            name,
            tag: captures.get(2).map(|m| m.as_str().to_owned()),
            digest: captures.get(3).map(|m| m.as_str().to_owned()),
        })
    }

    pub fn domain(&self) -> Option<&str> {
        split_domain(&self.name).0
    }

    /// `<name>/bundle[:<tag>][@<digest>]`
    pub fn bundle_tag(&self) -> String {
        let mut tag = format!("{}/bundle", self.name);
        if let Some(t) = &self.tag {
            tag.push(':');
            tag.push_str(t);
        }
        if let Some(d) = &self.digest {
            tag.push('@');
            tag.push_str(d);
        }
        tag
    }
}

/// The first path segment is a registry domain only when it looks like one.
fn split_domain(name: &str) -> (Option<&str>, &str) {
    match name.split_once('/') {
        Some((first, rest))
            if first.contains(['.', ':'])
                || first == "localhost"
                || first.chars().any(|c| c.is_ascii_uppercase()) =>
        {
            (Some(first), rest)
        }
        _ => (None, name),
    }
}

/// Name and versioned tag identifying the bundle the worker executes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleIdentity {
    pub name: String,
    pub tag: String,
}

impl BundleIdentity {
    /// Resolve from the first docker invocation image.
    pub fn resolve(bundle: &Bundle) -> Result<Self, CompileError> {
        let image = bundle
            .invocation_images
            .iter()
            .find(|i| i.image_type == "docker")
            .ok_or_else(|| CompileError::MissingInvocationImage {
                images: bundle
                    .invocation_images
                    .iter()
                    .map(|i| format!("{} ({})", i.image, i.image_type))
                    .collect(),
            })?;

        let reference = ImageReference::parse(&image.image)?;
        let tag = reference.bundle_tag();

        tracing::debug!(image = %image.image, bundle_tag = %tag, "bundle identity resolved");

        Ok(Self {
            name: bundle.name.clone(),
            tag,
        })
    }
}

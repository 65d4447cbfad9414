use std::fmt;
use std::str::FromStr;

use crate::error::SpecError;
use crate::node::Node;

use super::{check_key_positions, positions_node, require_sigil, Fields};

/// Hold-tap decision flavor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldTapFlavor {
    Balanced,
    TapPreferred,
    HoldPreferred,
}

impl HoldTapFlavor {
    pub const ALL: [HoldTapFlavor; 3] = [
        HoldTapFlavor::Balanced,
        HoldTapFlavor::TapPreferred,
        HoldTapFlavor::HoldPreferred,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HoldTapFlavor::Balanced => "balanced",
            HoldTapFlavor::TapPreferred => "tap-preferred",
            HoldTapFlavor::HoldPreferred => "hold-preferred",
        }
    }
}

impl fmt::Display for HoldTapFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HoldTapFlavor {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HoldTapFlavor::ALL
            .into_iter()
            .find(|flavor| flavor.as_str() == s)
            .ok_or_else(|| {
                SpecError::validation(
                    "flavor",
                    format!("'{}' is not one of balanced, tap-preferred, hold-preferred", s),
                )
            })
    }
}

/// A hold-tap behavior definition.
#[derive(Debug, Clone, PartialEq)]
pub struct HoldTapSpec {
    name: String,
    description: Option<String>,
    bindings: Vec<String>,
    tapping_term_ms: Option<u32>,
    flavor: Option<HoldTapFlavor>,
    quick_tap_ms: Option<u32>,
    require_prior_idle_ms: Option<u32>,
    hold_trigger_on_release: Option<bool>,
    hold_trigger_key_positions: Option<Vec<u8>>,
}

impl HoldTapSpec {
    pub fn new<I, S>(
        name: impl Into<String>,
        description: impl Into<String>,
        bindings: I,
    ) -> Result<Self, SpecError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        require_sigil("name", &name)?;
        let bindings: Vec<String> = bindings.into_iter().map(Into::into).collect();
        if bindings.is_empty() {
            return Err(SpecError::validation(
                "bindings",
                format!("hold-tap '{}' needs hold and tap bindings", name),
            ));
        }
        Ok(Self {
            name,
            description: Some(description.into()),
            bindings,
            tapping_term_ms: None,
            flavor: None,
            quick_tap_ms: None,
            require_prior_idle_ms: None,
            hold_trigger_on_release: None,
            hold_trigger_key_positions: None,
        })
    }

    pub fn with_tapping_term_ms(mut self, value: u32) -> Self {
        self.tapping_term_ms = Some(value);
        self
    }

    pub fn with_flavor(mut self, flavor: HoldTapFlavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    pub fn with_quick_tap_ms(mut self, value: u32) -> Self {
        self.quick_tap_ms = Some(value);
        self
    }

    pub fn with_require_prior_idle_ms(mut self, value: u32) -> Self {
        self.require_prior_idle_ms = Some(value);
        self
    }

    pub fn with_hold_trigger_on_release(mut self, value: bool) -> Self {
        self.hold_trigger_on_release = Some(value);
        self
    }

    /// Restrict hold triggering to these key positions (each in 0-79).
    pub fn with_hold_trigger_key_positions(mut self, positions: Vec<u8>) -> Result<Self, SpecError> {
        check_key_positions("holdTriggerKeyPositions", &positions)?;
        self.hold_trigger_key_positions = if positions.is_empty() {
            None
        } else {
            Some(positions)
        };
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn to_canonical(&self) -> Node {
        Fields::default()
            .push("name", self.name.as_str())
            .push_opt("description", self.description.clone())
            .push(
                "bindings",
                Node::List(self.bindings.iter().map(|b| Node::from(b.as_str())).collect()),
            )
            .push_opt("tappingTermMs", self.tapping_term_ms)
            .push_opt("flavor", self.flavor.map(|f| f.as_str()))
            .push_opt("quickTapMs", self.quick_tap_ms)
            .push_opt("requirePriorIdleMs", self.require_prior_idle_ms)
            .push_opt("holdTriggerOnRelease", self.hold_trigger_on_release)
            .push_opt(
                "holdTriggerKeyPositions",
                self.hold_trigger_key_positions
                    .as_deref()
                    .map(positions_node),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_full_hold_tap_canonical_order() {
        let spec = HoldTapSpec::new("&HRM_left_pinky", "home row mod", ["&kp", "&kp"])
            .unwrap()
            .with_tapping_term_ms(280)
            .with_flavor(HoldTapFlavor::Balanced)
            .with_quick_tap_ms(300)
            .with_require_prior_idle_ms(150)
            .with_hold_trigger_on_release(true)
            .with_hold_trigger_key_positions(vec![5, 6, 79])
            .unwrap();
        let value = spec.to_canonical().into_value().unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "name",
                "description",
                "bindings",
                "tappingTermMs",
                "flavor",
                "quickTapMs",
                "requirePriorIdleMs",
                "holdTriggerOnRelease",
                "holdTriggerKeyPositions"
            ]
        );
        assert_eq!(value["flavor"], json!("balanced"));
    }

    #[test]
    fn test_trigger_positions_range_checked() {
        let err = HoldTapSpec::new("&ht", "", ["&kp", "&kp"])
            .unwrap()
            .with_hold_trigger_key_positions(vec![80])
            .unwrap_err();
        assert!(
            matches!(err, SpecError::Validation { ref field, .. } if field == "holdTriggerKeyPositions")
        );
    }

    #[test]
    fn test_flavor_parse() {
        assert_eq!(
            "tap-preferred".parse::<HoldTapFlavor>().unwrap(),
            HoldTapFlavor::TapPreferred
        );
        assert!("eager".parse::<HoldTapFlavor>().is_err());
    }
}

//! Merchant preferences and the default price/auth-rate policy.

// self
use crate::_prelude::*;

const DEFAULT_PRICE: f64 = 0.05;
const DEFAULT_AUTH_RATE: f64 = 10.0;

/// Merchant preferences document fetched from the authority.
///
/// Only the defaulting-relevant fields are read; the remainder is carried
/// opaquely and persisted as received. Preferences are not kept in sync with
/// later server-side changes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
	/// Authority-suggested default item price, when provided.
	#[serde(default)]
	pub default_price: Option<serde_json::Value>,
	/// Authority-suggested default authorization rate, when provided.
	#[serde(default)]
	pub default_auth_rate: Option<serde_json::Value>,
	/// Remaining authority-provided fields, passed through untouched.
	#[serde(flatten)]
	pub extra: BTreeMap<String, serde_json::Value>,
}
impl Preferences {
	fn field_as_string(value: Option<&serde_json::Value>) -> Option<String> {
		match value? {
			serde_json::Value::String(text) => Some(text.clone()),
			serde_json::Value::Number(number) => Some(number.to_string()),
			_ => None,
		}
	}

	/// Authority default price rendered as a string, when usable.
	pub fn default_price_text(&self) -> Option<String> {
		Self::field_as_string(self.default_price.as_ref())
	}

	/// Authority default auth rate rendered as a string, when usable.
	pub fn default_auth_rate_text(&self) -> Option<String> {
		Self::field_as_string(self.default_auth_rate.as_ref())
	}
}

/// Locally stored merchant defaults, persisted as fixed-precision strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchantDefaults {
	/// Default item price.
	pub price: String,
	/// Default authorization rate.
	pub auth_rate: String,
}
impl MerchantDefaults {
	/// Merges stored defaults with authority preferences and applies the
	/// fallback policy: non-numeric or absent values become `0.05` / `10`,
	/// and both are formatted to 7 decimal digits.
	pub fn apply_policy(self, preferences: &Preferences) -> Self {
		let price = first_numeric(&self.price, preferences.default_price_text());
		let auth_rate = first_numeric(&self.auth_rate, preferences.default_auth_rate_text());

		Self {
			price: format_fixed(price.unwrap_or(DEFAULT_PRICE)),
			auth_rate: format_fixed(auth_rate.unwrap_or(DEFAULT_AUTH_RATE)),
		}
	}
}

fn first_numeric(stored: &str, authority: Option<String>) -> Option<f64> {
	parse_numeric(stored).or_else(|| authority.as_deref().and_then(parse_numeric))
}

fn parse_numeric(value: &str) -> Option<f64> {
	value.trim().parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

fn format_fixed(value: f64) -> String {
	format!("{value:.7}")
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn absent_and_non_numeric_defaults_fall_back() {
		let defaults = MerchantDefaults { price: String::new(), auth_rate: "abc".into() };
		let applied = defaults.apply_policy(&Preferences::default());

		assert_eq!(applied.price, "0.0500000");
		assert_eq!(applied.auth_rate, "10.0000000");
	}

	#[test]
	fn numeric_stored_defaults_keep_their_value() {
		let defaults = MerchantDefaults { price: "0.25".into(), auth_rate: "12".into() };
		let applied = defaults.apply_policy(&Preferences::default());

		assert_eq!(applied.price, "0.2500000");
		assert_eq!(applied.auth_rate, "12.0000000");
	}

	#[test]
	fn authority_preferences_seed_missing_defaults() {
		let preferences: Preferences = serde_json::from_str(
			"{\"default_price\":\"0.10\",\"default_auth_rate\":5,\"currency\":\"USD\"}",
		)
		.expect("Preferences document should parse successfully.");
		let applied = MerchantDefaults::default().apply_policy(&preferences);

		assert_eq!(applied.price, "0.1000000");
		assert_eq!(applied.auth_rate, "5.0000000");
		assert!(preferences.extra.contains_key("currency"));
	}

	#[test]
	fn stored_defaults_win_over_authority_suggestions() {
		let preferences: Preferences = serde_json::from_str("{\"default_price\":\"0.10\"}")
			.expect("Preferences document should parse successfully.");
		let defaults = MerchantDefaults { price: "0.30".into(), auth_rate: String::new() };
		let applied = defaults.apply_policy(&preferences);

		assert_eq!(applied.price, "0.3000000");
		assert_eq!(applied.auth_rate, "10.0000000");
	}
}

// Prompt sent to the generation service for a single area.

/// Market window the service is asked to price against.
pub const MARKET_WINDOW: &str = "2024-2025";

const PRICE_BAND_SHAPE: &str = r#"{
    "buy": {
        "1rk": {"min": <number>, "max": <number>, "confidence": "<low|medium|high>"},
        "1bhk": {"min": <number>, "max": <number>, "confidence": "<low|medium|high>"},
        "2bhk": {"min": <number>, "max": <number>, "confidence": "<low|medium|high>"},
        "3bhk_plus": {"min": <number>, "max": <number>, "confidence": "<low|medium|high>"}
    },
    "rent": {
        "1rk": {"min": <number>, "max": <number>, "confidence": "<low|medium|high>"},
        "1bhk": {"min": <number>, "max": <number>, "confidence": "<low|medium|high>"},
        "2bhk": {"min": <number>, "max": <number>, "confidence": "<low|medium|high>"},
        "3bhk_plus": {"min": <number>, "max": <number>, "confidence": "<low|medium|high>"}
    }
}"#;

/// Builds the price-band request for `area_name` in `city`.
///
/// The output is deterministic for a given pair of inputs.
pub fn build_price_prompt(area_name: &str, city: &str) -> String {
    format!(
        "You are a real estate data analyst. Search for current property prices in {area}, {city}, India.\n\
         \n\
         Find approximate price ranges for BUYING and RENTING properties in this area.\n\
         \n\
         Return ONLY a JSON object in this exact format (no markdown, no explanation):\n\
         {shape}\n\
         \n\
         Rules:\n\
         - All prices in INR (Indian Rupees)\n\
         - Buy prices are total purchase prices\n\
         - Rent prices are monthly rent\n\
         - min and max are whole numbers and max is never below min\n\
         - Confidence levels:\n\
         \x20 - \"low\": Sparse or inconsistent listings found\n\
         \x20 - \"medium\": Multiple recent listings available\n\
         \x20 - \"high\": Strong consensus across multiple sources\n\
         - Return realistic {city} market prices for {window}\n\
         - No text outside the JSON object",
        area = area_name,
        city = city,
        shape = PRICE_BAND_SHAPE,
        window = MARKET_WINDOW,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_names_area_and_city() {
        let prompt = build_price_prompt("Baner", "Pune");
        assert!(prompt.contains("Baner, Pune, India"));
        assert!(prompt.contains("realistic Pune market prices"));
    }

    #[test]
    fn test_prompt_requests_every_unit_type() {
        let prompt = build_price_prompt("Worli", "Mumbai");
        for key in ["\"1rk\"", "\"1bhk\"", "\"2bhk\"", "\"3bhk_plus\""] {
            assert_eq!(prompt.matches(key).count(), 2, "{} in buy and rent", key);
        }
        assert!(prompt.contains("INR"));
        assert!(prompt.contains("monthly rent"));
        assert!(prompt.contains("No text outside the JSON object"));
    }

    #[test]
    fn test_prompt_is_deterministic() {
        assert_eq!(
            build_price_prompt("Kharghar", "Mumbai"),
            build_price_prompt("Kharghar", "Mumbai")
        );
    }
}

use crate::domain::model::ModelKey;

/// 手工整理的型號詞彙表，依產品家族分組，家族內最特定的詞組在前。
///
/// 順序即 tie-break：同時提到多個產品的標題會落在先檢查的家族
/// （Xbox → PlayStation → Switch）。線性掃描、第一個命中即回傳。
const MODEL_LEXICON: &[(&str, ModelKey)] = &[
    // Xbox
    ("xbox series x", ModelKey::XboxSeriesX),
    ("xbox series s", ModelKey::XboxSeriesS),
    ("xbox one x", ModelKey::XboxOneX),
    ("xbox one s", ModelKey::XboxOneS),
    ("xbox one", ModelKey::XboxOne),
    // PlayStation
    ("ps5 digital", ModelKey::Ps5Digital),
    ("ps5", ModelKey::Ps5),
    ("ps4 pro", ModelKey::Ps4Pro),
    ("ps4 slim", ModelKey::Ps4Slim),
    ("ps4", ModelKey::Ps4),
    // Nintendo Switch
    ("nintendo switch", ModelKey::NintendoSwitch),
    ("switch", ModelKey::Switch),
];

/// 從標題判定主機型號，無法判定時回傳 None
pub fn identify_model(title: &str) -> Option<ModelKey> {
    let title_lower = title.to_lowercase();

    MODEL_LEXICON
        .iter()
        .find(|(pattern, _)| title_lower.contains(pattern))
        .map(|(_, key)| *key)
}

/// 不收購的型號詞組，比對方式與禁用詞相同（小寫子字串）
#[derive(Debug, Clone)]
pub struct ExcludedModels {
    pub terms: Vec<String>,
}

impl Default for ExcludedModels {
    fn default() -> Self {
        Self {
            terms: [
                // 不要的 PlayStation 世代
                "ps3",
                "psp",
                "playstation 3",
                "playstation3",
                // 不要的 Switch 版本
                "lite",
                "switch lite",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ExcludedModels {
    pub fn new(terms: Vec<String>) -> Self {
        Self { terms }
    }

    /// 回傳標題命中的第一個排除詞組
    pub fn matches(&self, title: &str) -> Option<&str> {
        let title_lower = title.to_lowercase();
        self.terms
            .iter()
            .find(|term| title_lower.contains(term.as_str()))
            .map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_most_specific_xbox_first() {
        assert_eq!(identify_model("Xbox Series X 1TB"), Some(ModelKey::XboxSeriesX));
        assert_eq!(
            identify_model("Xbox One S 500GB defect"),
            Some(ModelKey::XboxOneS)
        );
        assert_eq!(identify_model("xbox one cu un maneta"), Some(ModelKey::XboxOne));
    }

    #[test]
    fn test_family_order_breaks_ties() {
        // 同時提到兩個產品時，先檢查的家族勝出
        assert_eq!(
            identify_model("Xbox Series X sau Xbox One"),
            Some(ModelKey::XboxSeriesX)
        );
        assert_eq!(
            identify_model("Schimb PS5 cu Xbox One"),
            Some(ModelKey::XboxOne)
        );
    }

    #[test]
    fn test_playstation_and_switch() {
        assert_eq!(identify_model("PS5 Digital Edition"), Some(ModelKey::Ps5Digital));
        assert_eq!(identify_model("Consola ps4 pro 1tb"), Some(ModelKey::Ps4Pro));
        assert_eq!(
            identify_model("Nintendo Switch cu jocuri"),
            Some(ModelKey::NintendoSwitch)
        );
        assert_eq!(identify_model("Vand switch modat"), Some(ModelKey::Switch));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(identify_model("Laptop Lenovo defect"), None);
    }

    #[test]
    fn test_excluded_models() {
        let excluded = ExcludedModels::default();
        assert_eq!(excluded.matches("Consola PS3 defecta"), Some("ps3"));
        assert_eq!(excluded.matches("Switch Lite turquoise"), Some("lite"));
        assert_eq!(excluded.matches("Xbox One S defect"), None);
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanIcon {
    Zap,
    Star,
    Crown,
}

/// A time-bounded discount annotation attached to a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub active: bool,

    /// Display text, e.g. "%20 İndirim".
    pub discount_text: String,

    /// "YYYY-MM-DD"; no enforcement, purely informational.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
}

/// A purchasable pricing plan.
///
/// Plans are process-wide shared state: the admin panel edits them and
/// every user sees the edited list on next load. There is no per-user
/// ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConfig {
    pub id: String,

    pub name: String,

    /// Plan tier name; free-form so admins can add custom tiers.
    #[serde(rename = "type")]
    pub plan_type: String,

    /// Minutes of transcription credit the plan grants per purchase.
    pub minutes: u64,

    /// Display price including currency, e.g. "₺499".
    pub price: String,

    pub features: Vec<String>,

    /// UI accent classes; opaque to the backend.
    pub color: String,

    pub icon: PlanIcon,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign: Option<Campaign>,
}

/// The three seeded plans shown before an admin ever edits pricing.
pub fn default_plans() -> Vec<PlanConfig> {
    vec![
        PlanConfig {
            id: "plan_starter".to_string(),
            name: "Giriş".to_string(),
            plan_type: "Giriş".to_string(),
            minutes: 300,
            price: "₺299".to_string(),
            features: vec![
                "Aylık 300 Dakika".to_string(),
                "Temel Döküm".to_string(),
                "E-posta Desteği".to_string(),
            ],
            color: "bg-blue-50 text-blue-600".to_string(),
            icon: PlanIcon::Zap,
            recommended: None,
            campaign: None,
        },
        PlanConfig {
            id: "plan_standard".to_string(),
            name: "Standart".to_string(),
            plan_type: "Standart".to_string(),
            minutes: 500,
            price: "₺499".to_string(),
            features: vec![
                "Aylık 500 Dakika".to_string(),
                "AI Seans Raporu".to_string(),
                "Öncelikli Destek".to_string(),
                "Düzenlenebilir Metin".to_string(),
            ],
            color: "bg-indigo-50 text-indigo-600".to_string(),
            icon: PlanIcon::Star,
            recommended: Some(true),
            campaign: None,
        },
        PlanConfig {
            id: "plan_pro".to_string(),
            name: "Gelişmiş".to_string(),
            plan_type: "Gelişmiş".to_string(),
            minutes: 2000,
            price: "₺1499".to_string(),
            features: vec![
                "Aylık 2000 Dakika".to_string(),
                "Gelişmiş AI Analizi".to_string(),
                "7/24 Canlı Destek".to_string(),
                "Sınırsız Arşiv".to_string(),
            ],
            color: "bg-purple-50 text-purple-600".to_string(),
            icon: PlanIcon::Crown,
            recommended: None,
            campaign: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plans_seeded() {
        let plans = default_plans();
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[1].plan_type, "Standart");
        assert_eq!(plans[1].recommended, Some(true));
        assert_eq!(plans[2].minutes, 2000);
    }

    #[test]
    fn test_plan_type_serializes_as_type() {
        let json = serde_json::to_value(&default_plans()[0]).unwrap();
        assert_eq!(json["type"], "Giriş");
        assert!(json.get("campaign").is_none());
    }
}

/// Nutritionix application credentials. Both halves are required.
#[derive(Debug, Clone)]
pub struct NutritionixConfig {
    pub app_id: String,
    pub app_key: String,
}

impl NutritionixConfig {
    pub fn from_parts(app_id: Option<String>, app_key: Option<String>) -> Option<Self> {
        Some(Self {
            app_id: app_id?,
            app_key: app_key?,
        })
    }
}

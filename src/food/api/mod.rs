pub mod nutritionix;

pub use nutritionix::NutritionixClient;

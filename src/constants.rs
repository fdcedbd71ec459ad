pub const RECIPE_NAME_MAX_LENGTH: usize = 200;
pub const RECIPES_LIMIT_DEFAULT: i64 = 6;

pub const DEFAULT_MAX_CONNECTIONS: i64 = 5;
pub const ENV_PREFIX: &str = "FOODGRAM";

/// (name, color, slug)
pub const DEFAULT_TAGS: &[(&str, &str, &str)] = &[
    ("Breakfast", "#E26C2D", "breakfast"),
    ("Lunch", "#49B64E", "dinner"),
    ("Dinner", "#8775D2", "late_dinner"),
];

pub const SHOPPING_LIST_TITLE: &str = "Shopping list";

// Shopping list PDF layout, in millimetres on A4.
pub const PDF_PAGE_WIDTH: f32 = 210.0;
pub const PDF_PAGE_HEIGHT: f32 = 297.0;
pub const PDF_MARGIN_LEFT: f32 = 20.0;
pub const PDF_TITLE_Y: f32 = 275.0;
pub const PDF_FIRST_LINE_Y: f32 = 260.0;
pub const PDF_LINE_STEP: f32 = 8.0;
pub const PDF_MARGIN_BOTTOM: f32 = 20.0;
pub const PDF_TITLE_FONT_SIZE: f32 = 18.0;
pub const PDF_LINE_FONT_SIZE: f32 = 12.0;

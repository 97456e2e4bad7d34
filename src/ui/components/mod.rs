pub mod alert_overlay;
pub mod chat_area;
pub mod input_bar;
pub mod sidebar;

use eframe::egui::Color32;
use matru_live::common::Priority;

/// Fill, border and text colors for a priority tier.
pub fn priority_palette(priority: Priority) -> (Color32, Color32, Color32) {
    match priority {
        Priority::Red => (
            Color32::from_rgb(254, 226, 226),
            Color32::from_rgb(239, 68, 68),
            Color32::from_rgb(127, 29, 29),
        ),
        Priority::Yellow => (
            Color32::from_rgb(254, 252, 232),
            Color32::from_rgb(234, 179, 8),
            Color32::from_rgb(113, 63, 18),
        ),
        Priority::Green => (
            Color32::from_rgb(240, 253, 244),
            Color32::from_rgb(34, 197, 94),
            Color32::from_rgb(20, 83, 45),
        ),
    }
}

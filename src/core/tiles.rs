//! Purpose: Describe the campus map tile layers as URL templates.
//! Exports: `TileLayer`, `TILE_SIZE`.
//! Role: Input contract for an external tile renderer; no fetching happens here.
//! Invariants: Labels draw above the base layer (higher z-index).

pub const TILE_SIZE: u32 = 256;

const TILE_ROOT: &str = "https://www.carleton.edu/global_stock/images/campus_map/tiles";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TileLayer {
    Base,
    Labels,
}

impl TileLayer {
    pub fn all() -> [TileLayer; 2] {
        [TileLayer::Base, TileLayer::Labels]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TileLayer::Base => "base",
            TileLayer::Labels => "labels",
        }
    }

    pub fn z_index(self) -> i32 {
        match self {
            TileLayer::Base => 0,
            TileLayer::Labels => 1,
        }
    }

    pub fn url(self, x: u32, y: u32, zoom: u32) -> String {
        format!("{TILE_ROOT}/{}/{zoom}_{x}_{y}.png", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::TileLayer;

    #[test]
    fn url_orders_zoom_x_y() {
        assert_eq!(
            TileLayer::Base.url(3, 7, 16),
            "https://www.carleton.edu/global_stock/images/campus_map/tiles/base/16_3_7.png"
        );
        assert_eq!(
            TileLayer::Labels.url(0, 1, 2),
            "https://www.carleton.edu/global_stock/images/campus_map/tiles/labels/2_0_1.png"
        );
    }

    #[test]
    fn labels_sit_above_base() {
        assert!(TileLayer::Labels.z_index() > TileLayer::Base.z_index());
    }
}

use std::f64::consts::PI;

use serde::Serialize;
use utoipa::ToSchema;

use crate::config::MapConfig;

/// Web Mercator cannot project the poles
const MAX_LATITUDE: f64 = 85.051_128_78;
const TILE_SIZE: f64 = 256.0;
const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
const MARKER_LABEL: &str = "Location";
/// Deepest zoom any public tile server offers
const ZOOM_LIMIT: u8 = 19;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub z: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    /// Pixel offset of the marker inside the center tile
    pub offset_x: u32,
    pub offset_y: u32,
}

/// A tile map centered on one coordinate with a single marker
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
    pub max_zoom: u8,
    pub tile_url_template: String,
    pub center_tile: TileCoord,
    pub center_tile_url: String,
    pub marker: Marker,
}

pub struct MapPresenter {
    zoom: u8,
    max_zoom: u8,
    tile_url_template: String,
}

impl MapPresenter {
    pub fn new(config: &MapConfig) -> Self {
        let max_zoom = config.max_zoom.min(ZOOM_LIMIT);
        if max_zoom < config.max_zoom {
            tracing::warn!(
                configured = config.max_zoom,
                limit = ZOOM_LIMIT,
                "Map max_zoom is beyond the tile limit, clamping"
            );
        }

        Self {
            zoom: config.zoom.min(max_zoom),
            max_zoom,
            tile_url_template: config.tile_url.clone(),
        }
    }

    /// Build the map for a location; each call produces a fresh view that replaces the last one
    pub fn show(&self, lat: f64, lon: f64) -> MapView {
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let lon = wrap_longitude(lon);
        let (px, py) = world_pixel(lat, lon, self.zoom);

        let tiles = 1u32 << self.zoom;
        let center_tile = TileCoord {
            x: ((px / TILE_SIZE) as u32).min(tiles - 1),
            y: ((py / TILE_SIZE) as u32).min(tiles - 1),
            z: self.zoom,
        };

        tracing::debug!(lat = %lat, lon = %lon, zoom = self.zoom, "Map centered");

        MapView {
            lat,
            lon,
            zoom: self.zoom,
            max_zoom: self.max_zoom,
            tile_url_template: self.tile_url_template.clone(),
            center_tile,
            center_tile_url: self.tile_url(center_tile),
            marker: Marker {
                lat,
                lon,
                label: MARKER_LABEL.to_string(),
                offset_x: (px - f64::from(center_tile.x) * TILE_SIZE) as u32,
                offset_y: (py - f64::from(center_tile.y) * TILE_SIZE) as u32,
            },
        }
    }

    pub fn tile_url(&self, tile: TileCoord) -> String {
        let subdomain = SUBDOMAINS[((tile.x + tile.y) % SUBDOMAINS.len() as u32) as usize];
        self.tile_url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

fn wrap_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        lon
    } else {
        (lon + 180.0).rem_euclid(360.0) - 180.0
    }
}

/// Global pixel position of a coordinate at the given zoom (spherical Mercator)
fn world_pixel(lat: f64, lon: f64, zoom: u8) -> (f64, f64) {
    let scale = TILE_SIZE * f64::from(1u32 << zoom);
    let x = (lon + 180.0) / 360.0 * scale;
    let lat_rad = lat.to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * scale;
    (x.clamp(0.0, scale - 1.0), y.clamp(0.0, scale - 1.0))
}

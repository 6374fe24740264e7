use std::fmt::Write;

use super::models::{Region, ViewModel};
use crate::map::MapView;
use crate::weather::UnitSystem;

const STYLE: &str = r#"
body { font-family: sans-serif; background: #f2f5f9; color: #222; margin: 0; }
body.dark { background: #15181d; color: #ddd; }
.container { max-width: 640px; margin: 2em auto; padding: 1.5em; background: #fff; border-radius: 8px; }
.container.dark { background: #23272e; }
h1.dark, h2.dark { color: #9cc3ff; }
button { cursor: pointer; }
button.dark { background: #3a3f48; color: #eee; border: 1px solid #555; }
.hidden { display: none; }
.error { color: #b00020; }
.forecast { display: flex; flex-wrap: wrap; gap: 1em; }
.map { position: relative; width: 256px; height: 256px; overflow: hidden; }
.map .marker { position: absolute; transform: translate(-50%, -100%); font-size: 24px; }
.favorites form { display: inline; }
"#;

/// Escape text for use in element content and quoted attribute values
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn hidden_unless(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        " hidden"
    }
}

fn unit_option(unit: UnitSystem, selected: UnitSystem, label: &str) -> String {
    let selected_attr = if unit == selected { " selected" } else { "" };
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        unit.as_str(),
        selected_attr,
        label
    )
}

fn render_map(out: &mut String, map: &MapView) {
    let _ = write!(
        out,
        r#"<div id="map" class="map"><img src="{tile}" alt="Map tile" width="256" height="256"/><span class="marker" style="left: {x}px; top: {y}px" title="{label}">&#x1F4CD;</span></div><p><a href="https://www.openstreetmap.org/?mlat={lat}&amp;mlon={lon}#map={zoom}/{lat}/{lon}">{label}</a></p>"#,
        tile = escape(&map.center_tile_url),
        x = map.marker.offset_x,
        y = map.marker.offset_y,
        label = escape(&map.marker.label),
        lat = map.lat,
        lon = map.lon,
        zoom = map.zoom,
    );
}

/// Render the whole widget page
pub fn render_page(view: &ViewModel) -> String {
    let styling = &view.styling;
    let button_class = styling.class_for(Region::Buttons);
    let heading_class = styling.class_for(Region::Headings);

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"/><title>Weather</title><style>{STYLE}</style></head><body class="{body}"><div class="container {container}">"#,
        body = styling.class_for(Region::Body),
        container = styling.class_for(Region::Container),
    );

    let _ = write!(
        out,
        r#"<h1 class="{heading_class}">Weather</h1><form method="post" action="/theme"><button id="themeToggle" class="{button_class}" type="submit">Toggle Theme</button></form>"#,
    );

    let _ = write!(
        out,
        r#"<form method="post" action="/query"><input id="city" name="city" type="text" placeholder="Enter city" value="{city}"/><button id="getWeather" class="{button_class}" type="submit">Get Weather</button></form>"#,
        city = escape(&view.city),
    );

    let _ = write!(
        out,
        r#"<form method="post" action="/unit"><select id="unitSelector" name="unit">{metric}{imperial}</select><button class="{button_class}" type="submit">Apply</button></form>"#,
        metric = unit_option(UnitSystem::Metric, view.unit, "Celsius"),
        imperial = unit_option(UnitSystem::Imperial, view.unit, "Fahrenheit"),
    );

    let _ = write!(
        out,
        r#"<div id="loading" class="loading{}"><div class="spinner">Loading…</div></div>"#,
        hidden_unless(view.loading)
    );

    if let Some(error) = &view.error {
        let _ = write!(
            out,
            r#"<div id="error" class="error"><p>{}</p></div>"#,
            escape(&error.message)
        );
    }

    if let Some(weather) = &view.weather {
        let _ = write!(
            out,
            r#"<div id="weatherResult"><h2 class="{heading_class}">{}</h2>"#,
            escape(&weather.title)
        );
        for line in &weather.lines {
            let _ = write!(out, "<p>{}</p>", escape(line));
        }
        let _ = write!(
            out,
            r#"<img src="{}" alt="Weather Icon"/></div>"#,
            escape(&weather.icon_url)
        );
    }

    let _ = write!(
        out,
        r#"<form method="post" action="/favorites" class="{}"><button id="saveFavorite" class="{button_class}" type="submit">Save Favorite</button></form>"#,
        hidden_unless(view.save_favorite_visible).trim()
    );

    if let Some(forecast) = &view.forecast {
        out.push_str(r#"<div id="forecastResult" class="forecast">"#);
        for day in &forecast.days {
            let _ = write!(
                out,
                r#"<div><h3>{}</h3><p>{}</p><img src="{}" alt="Weather Icon"/></div>"#,
                escape(&day.date),
                escape(&day.average),
                escape(&day.icon_url)
            );
        }
        out.push_str("</div>");
    }

    if let Some(map) = &view.map {
        render_map(&mut out, map);
    }

    let _ = write!(
        out,
        r#"<h2 class="{heading_class}">Favorites</h2><ul id="favoritesList" class="favorites">"#
    );
    for city in &view.favorites {
        let city = escape(city);
        let _ = write!(
            out,
            r#"<li><form method="post" action="/favorites/select"><input type="hidden" name="city" value="{city}"/><button class="{button_class}" type="submit">{city}</button></form></li>"#
        );
    }
    out.push_str("</ul></div></body></html>");

    out
}

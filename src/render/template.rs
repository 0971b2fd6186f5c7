//! Page template for the car listing
//!
//! The template is plain HTML with three slots:
//! - `{{ title }}`: page title (escaped)
//! - `{{ request }}`: method and path of the current request (escaped)
//! - `{{ cars }}`: the rendered car list, followed by the same cars as a
//!   JSON list of single-key mappings `{"<id>": car}`
//!
//! `{{ cars }}` is required; the other slots are optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use crate::schema::Car;
use crate::store::CarId;

const BUILTIN_HOME: &str = include_str!("../../templates/home.html");

const TITLE_SLOT: &str = "{{ title }}";
const REQUEST_SLOT: &str = "{{ request }}";
const CARS_SLOT: &str = "{{ cars }}";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to read template {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template is missing the required slot {0}")]
    MissingSlot(&'static str),

    #[error("Failed to encode cars: {0}")]
    Json(#[from] serde_json::Error),
}

/// Values a page is rendered with
#[derive(Debug, Clone)]
pub struct PageContext {
    pub request: String,
    pub title: String,
    pub cars: Vec<(CarId, Car)>,
}

impl PageContext {
    pub fn new(request: impl Into<String>, title: impl Into<String>, cars: Vec<(CarId, Car)>) -> Self {
        Self {
            request: request.into(),
            title: title.into(),
            cars,
        }
    }

    /// Cars as a list of single-key mappings, keyed by the stringified id
    pub fn car_mappings(&self) -> Result<Vec<Map<String, Value>>, RenderError> {
        self.cars
            .iter()
            .map(|(id, car)| -> Result<Map<String, Value>, RenderError> {
                let mut entry = Map::new();
                entry.insert(id.to_string(), serde_json::to_value(car)?);
                Ok(entry)
            })
            .collect()
    }
}

/// The listing page template
#[derive(Debug, Clone)]
pub struct HomeTemplate {
    source: String,
}

impl HomeTemplate {
    /// Template compiled into the binary
    pub fn builtin() -> Self {
        Self {
            source: BUILTIN_HOME.to_string(),
        }
    }

    pub fn from_source(source: impl Into<String>) -> Result<Self, RenderError> {
        let source = source.into();
        if !source.contains(CARS_SLOT) {
            return Err(RenderError::MissingSlot(CARS_SLOT));
        }
        Ok(Self { source })
    }

    /// Load a template from disk
    pub fn load(path: &Path) -> Result<Self, RenderError> {
        let source = fs::read_to_string(path).map_err(|source| RenderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(source)
    }

    pub fn render(&self, ctx: &PageContext) -> Result<String, RenderError> {
        let cars = render_cars(ctx)?;
        Ok(self
            .source
            .replace(TITLE_SLOT, &escape_html(&ctx.title))
            .replace(REQUEST_SLOT, &escape_html(&ctx.request))
            .replace(CARS_SLOT, &cars))
    }
}

impl Default for HomeTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

fn render_cars(ctx: &PageContext) -> Result<String, RenderError> {
    let mut out = String::with_capacity(256 * (ctx.cars.len() + 1));

    if ctx.cars.is_empty() {
        out.push_str("<p class=\"empty\">No cars.</p>\n");
    } else {
        out.push_str("<ul class=\"cars\">\n");
        for (id, car) in &ctx.cars {
            out.push_str(&format!(
                "<li class=\"car\" id=\"car-{id}\"><a href=\"/cars/{id}\">#{id}</a>\n<dl>\n"
            ));
            for (label, value) in car_rows(car) {
                out.push_str("<dt>");
                out.push_str(label);
                out.push_str("</dt><dd>");
                out.push_str(&escape_html(&value));
                out.push_str("</dd>\n");
            }
            out.push_str("</dl>\n</li>\n");
        }
        out.push_str("</ul>\n");
    }

    // "</" inside a script element would close it early
    let data = serde_json::to_string(&ctx.car_mappings()?)?.replace("</", "<\\/");
    out.push_str("<script type=\"application/json\" id=\"cars-data\">");
    out.push_str(&data);
    out.push_str("</script>");

    Ok(out)
}

fn car_rows(car: &Car) -> Vec<(&'static str, String)> {
    let mut rows = Vec::new();
    if let Some(make) = &car.make {
        rows.push(("Make", make.clone()));
    }
    if let Some(model) = &car.model {
        rows.push(("Model", model.clone()));
    }
    if let Some(year) = car.year {
        rows.push(("Year", year.to_string()));
    }
    if let Some(price) = car.price {
        rows.push(("Price", price.to_string()));
    }
    if let Some(engine) = &car.engine {
        rows.push(("Engine", engine.clone()));
    }
    if let Some(autonomous) = car.autonomous {
        rows.push(("Autonomous", if autonomous { "yes" } else { "no" }.to_string()));
    }
    if let Some(sold) = &car.sold {
        rows.push(("Sold", sold.join(", ")));
    }
    rows
}

/// Escape text for an HTML text node or attribute value
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            c => out.push(c),
        }
    }
    out
}

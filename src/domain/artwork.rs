//! Placeholder card artwork stored alongside each article.

use serde::{Deserialize, Serialize};

use super::categories::CategoryId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvgGradient {
    pub id: String,
    pub colors: [String; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvgIcon {
    #[serde(rename = "type")]
    pub kind: String,
    pub elements: Vec<SvgShape>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SvgShape {
    Circle(Circle),
    Rect(Rect),
    Path(PathShape),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub cx: u32,
    pub cy: u32,
    pub r: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rx: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathShape {
    pub d: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl SvgShape {
    pub fn tag(&self) -> &'static str {
        match self {
            SvgShape::Circle(_) => "circle",
            SvgShape::Rect(_) => "rect",
            SvgShape::Path(_) => "path",
        }
    }

    /// Attribute pairs in emission order, with the card renderer's defaults
    /// filled in for absent values. Values are raw and must be escaped by
    /// the caller.
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        let none = || "none".to_string();
        match self {
            SvgShape::Circle(c) => vec![
                ("cx", c.cx.to_string()),
                ("cy", c.cy.to_string()),
                ("r", c.r.to_string()),
                ("fill", c.fill.clone().unwrap_or_else(none)),
                ("stroke", c.stroke.clone().unwrap_or_else(none)),
                ("stroke-width", c.stroke_width.unwrap_or(0).to_string()),
                ("opacity", c.opacity.unwrap_or(1.0).to_string()),
            ],
            SvgShape::Rect(r) => vec![
                ("x", r.x.to_string()),
                ("y", r.y.to_string()),
                ("width", r.width.to_string()),
                ("height", r.height.to_string()),
                ("rx", r.rx.unwrap_or(0).to_string()),
                ("fill", r.fill.clone().unwrap_or_else(none)),
                ("opacity", r.opacity.unwrap_or(1.0).to_string()),
            ],
            SvgShape::Path(p) => vec![
                ("d", p.d.clone()),
                ("stroke", p.stroke.clone().unwrap_or_else(none)),
                ("stroke-width", p.stroke_width.unwrap_or(1).to_string()),
                (
                    "stroke-dasharray",
                    p.stroke_dasharray.clone().unwrap_or_else(none),
                ),
                ("fill", p.fill.clone().unwrap_or_else(none)),
                ("opacity", p.opacity.unwrap_or(1.0).to_string()),
            ],
        }
    }
}

const WHITE: &str = "white";

fn circle(cx: u32, cy: u32, r: u32, opacity: f64) -> SvgShape {
    SvgShape::Circle(Circle {
        cx,
        cy,
        r,
        fill: Some(WHITE.into()),
        opacity: Some(opacity),
        ..Circle::default()
    })
}

fn ring(cx: u32, cy: u32, r: u32, stroke_width: u32, opacity: f64) -> SvgShape {
    SvgShape::Circle(Circle {
        cx,
        cy,
        r,
        fill: Some("none".into()),
        stroke: Some(WHITE.into()),
        stroke_width: Some(stroke_width),
        opacity: Some(opacity),
    })
}

fn rect(x: u32, y: u32, width: u32, height: u32, rx: Option<u32>, opacity: f64) -> SvgShape {
    SvgShape::Rect(Rect {
        x,
        y,
        width,
        height,
        rx,
        fill: Some(WHITE.into()),
        opacity: Some(opacity),
    })
}

fn stroke(d: &str, stroke_width: u32, dasharray: Option<&str>, opacity: f64) -> SvgShape {
    SvgShape::Path(PathShape {
        d: d.into(),
        stroke: Some(WHITE.into()),
        stroke_width: Some(stroke_width),
        stroke_dasharray: dasharray.map(str::to_string),
        fill: None,
        opacity: Some(opacity),
    })
}

pub fn gradient_for(category: CategoryId) -> SvgGradient {
    let (id, from, to) = match category {
        CategoryId::Seo => ("seo-gradient", "#10B981", "#059669"),
        CategoryId::Ads => ("ads-gradient", "#F59E0B", "#D97706"),
        CategoryId::Sns => ("sns-gradient", "#06B6D4", "#0891B2"),
        CategoryId::Marketing => ("marketing-gradient", "#EC4899", "#DB2777"),
        CategoryId::WebProduction => ("web-gradient", "#6366F1", "#4F46E5"),
        CategoryId::Ai => ("ai-gradient", "#8B5CF6", "#7C3AED"),
        CategoryId::Misc => ("misc-gradient", "#8B7355", "#6B5844"),
    };
    SvgGradient {
        id: id.to_string(),
        colors: [from.to_string(), to.to_string()],
    }
}

pub fn icon_for(category: CategoryId) -> SvgIcon {
    let elements = match category {
        CategoryId::Seo => vec![
            ring(150, 125, 40, 4, 0.7),
            stroke("M180 150 L220 190", 4, None, 0.7),
        ],
        CategoryId::Ads => vec![
            rect(100, 150, 40, 50, None, 0.5),
            rect(150, 120, 40, 80, None, 0.6),
            rect(200, 90, 40, 110, None, 0.7),
        ],
        CategoryId::Sns => vec![
            circle(120, 125, 20, 0.6),
            circle(200, 125, 20, 0.6),
            circle(280, 125, 20, 0.6),
            stroke("M140 125 L180 125 M220 125 L260 125", 3, None, 0.5),
        ],
        CategoryId::Marketing => vec![
            circle(200, 100, 25, 0.6),
            circle(150, 150, 20, 0.5),
            circle(250, 150, 20, 0.5),
            stroke("M200 125 L150 130 M200 125 L250 130", 3, None, 0.6),
        ],
        CategoryId::WebProduction => vec![
            rect(120, 100, 160, 100, Some(8), 0.4),
            circle(200, 130, 15, 0.7),
            rect(140, 160, 50, 8, Some(2), 0.6),
        ],
        CategoryId::Ai => vec![
            circle(140, 125, 35, 0.3),
            circle(140, 125, 25, 0.5),
            circle(260, 125, 35, 0.3),
            stroke("M175 125h50", 2, Some("8 4"), 0.6),
        ],
        CategoryId::Misc => vec![circle(200, 125, 40, 0.4), rect(180, 110, 40, 30, Some(4), 0.6)],
    };
    SvgIcon {
        kind: category.as_str().to_string(),
        elements,
    }
}

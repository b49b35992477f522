// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pages and draw commands: the layout engine's output model. The PDF
// encoder turns each command into printpdf operations.

/// A position in PDF points, origin at the bottom-left of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// An RGB colour with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const BRAND: Color = Color::rgb(0.23, 0.51, 0.96);
    pub const NAVY: Color = Color::rgb(0.1, 0.2, 0.4);
    pub const GREY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const RULE: Color = Color::rgb(0.7, 0.7, 0.7);
    pub const TRACK: Color = Color::rgb(0.9, 0.9, 0.9);
    pub const ALERT: Color = Color::rgb(0.8, 0.2, 0.2);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

/// One of the two built-in faces used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

/// Named text styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Brand,
    Heading,
    Subtitle,
    Label,
    Body,
    Muted,
    Alert,
}

impl TextStyle {
    pub fn font(&self) -> Font {
        match self {
            Self::Brand | Self::Heading | Self::Label | Self::Alert => Font::Bold,
            Self::Subtitle | Self::Body | Self::Muted => Font::Regular,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Brand => Color::BRAND,
            Self::Heading | Self::Label => Color::NAVY,
            Self::Subtitle => Color::rgb(0.3, 0.3, 0.3),
            Self::Body => Color::rgb(0.2, 0.2, 0.2),
            Self::Muted => Color::GREY,
            Self::Alert => Color::ALERT,
        }
    }
}

/// Font size of the text inside a stamp block.
pub const STAMP_TEXT_SIZE: f32 = 8.0;
/// Inset of stamp text from the stamp outline.
pub const STAMP_PADDING: f32 = 6.0;

/// A single drawing operation. Positions are bottom-left corners, except
/// text, whose position is the baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Text {
        content: String,
        position: Point,
        size: f32,
        style: TextStyle,
    },
    Image {
        asset: String,
        position: Point,
        width: f32,
        height: f32,
    },
    /// Horizontal rule.
    Rule { position: Point, length: f32 },
    /// Outlined box holding lines of bold text (the report seal).
    StampBlock {
        position: Point,
        width: f32,
        height: f32,
        lines: Vec<String>,
    },
    /// Score bar: a grey track filled to `fraction` of its width.
    Gauge {
        position: Point,
        width: f32,
        height: f32,
        fraction: f32,
    },
}

impl DrawCommand {
    /// `(bottom, top)` of the area this command paints.
    pub fn vertical_extent(&self) -> (f32, f32) {
        match self {
            Self::Text { position, size, .. } => (position.y, position.y + size),
            Self::Rule { position, .. } => (position.y, position.y),
            Self::Image {
                position, height, ..
            }
            | Self::StampBlock {
                position, height, ..
            }
            | Self::Gauge {
                position, height, ..
            } => (position.y, position.y + height),
        }
    }

    /// Baselines of the lines inside a stamp block, top line first.
    pub fn stamp_baselines(position: Point, height: f32, count: usize) -> Vec<f32> {
        let advance = STAMP_TEXT_SIZE + 2.0;
        (0..count)
            .map(|i| position.y + height - STAMP_PADDING - STAMP_TEXT_SIZE - i as f32 * advance)
            .filter(|&y| y >= position.y)
            .collect()
    }
}

/// One finalized page of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Zero-based position in the document.
    pub index: usize,
    pub width: f32,
    pub height: f32,
    pub commands: Vec<DrawCommand>,
}

impl Page {
    pub fn new(index: usize, width: f32, height: f32) -> Self {
        Self {
            index,
            width,
            height,
            commands: Vec::new(),
        }
    }
}

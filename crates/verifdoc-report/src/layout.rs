// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Paginated layout engine.
//
// Content blocks flow top to bottom under an explicit `LayoutCursor`. Each
// block is measured first; if it does not fit above the content floor the
// current page is finalized and the block starts a fresh page. Blocks are
// never split, so a block taller than a whole page is an error. A footer
// stamp is applied to every finished page as a post-pass.

use tracing::{debug, info, instrument};
use verifdoc_core::config::PageConfig;
use verifdoc_core::error::{Result, VerifdocError};

use crate::page::{DrawCommand, Page, Point, TextStyle};
use crate::text::{chars_per_line, sanitize, wrap_text};

/// Size of section titles.
pub const TITLE_SIZE: f32 = 16.0;
/// Size of footer text.
pub const FOOTER_TEXT_SIZE: f32 = 8.0;
const SEAL_WIDTH: f32 = 120.0;
const SEAL_HEIGHT: f32 = 30.0;

/// What a block draws.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    /// Wrapped text; `indent` shifts it right and narrows the wrap width.
    Text {
        text: String,
        size: f32,
        style: TextStyle,
        indent: f32,
    },
    /// An embedded asset at its already scaled size.
    Image {
        asset: String,
        width: f32,
        height: f32,
    },
    /// Full-width score bar.
    Gauge { fraction: f32, height: f32 },
}

/// A unit of content that is placed on a single page.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Identity reported when the block cannot be placed.
    pub id: String,
    pub content: BlockContent,
    /// Gap above the block, dropped at the top of a page.
    pub space_before: f32,
    /// Only place this block where the first line of the next one fits too.
    pub keep_with_next: bool,
}

impl Block {
    /// A text block. The text is folded to ASCII for the built-in fonts.
    pub fn text(id: impl Into<String>, text: &str, size: f32, style: TextStyle) -> Self {
        Self {
            id: id.into(),
            content: BlockContent::Text {
                text: sanitize(text),
                size,
                style,
                indent: 0.0,
            },
            space_before: 0.0,
            keep_with_next: false,
        }
    }

    /// A section title, kept together with whatever follows it.
    pub fn title(id: impl Into<String>, text: &str, spacing: f32) -> Self {
        Self::text(id, text, TITLE_SIZE, TextStyle::Heading)
            .with_space_before(spacing)
            .kept_with_next()
    }

    pub fn image(id: impl Into<String>, asset: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            content: BlockContent::Image {
                asset: asset.into(),
                width,
                height,
            },
            space_before: 0.0,
            keep_with_next: false,
        }
    }

    pub fn gauge(id: impl Into<String>, fraction: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            content: BlockContent::Gauge { fraction, height },
            space_before: 0.0,
            keep_with_next: false,
        }
    }

    pub fn indented(mut self, by: f32) -> Self {
        if let BlockContent::Text { indent, .. } = &mut self.content {
            *indent = by;
        }
        self
    }

    pub fn with_space_before(mut self, space: f32) -> Self {
        self.space_before = space;
        self
    }

    pub fn kept_with_next(mut self) -> Self {
        self.keep_with_next = true;
        self
    }

    /// Wrapped lines of a text block; empty for other blocks.
    pub fn lines(&self, config: &PageConfig) -> Vec<String> {
        match &self.content {
            BlockContent::Text {
                text, size, indent, ..
            } => {
                let width = config.content_width() - indent;
                wrap_text(text, chars_per_line(width, *size, config.char_width_factor))
            }
            _ => Vec::new(),
        }
    }

    /// Height the block occupies, excluding `space_before` and block spacing.
    pub fn required_height(&self, config: &PageConfig) -> f32 {
        match &self.content {
            BlockContent::Text { size, .. } => {
                self.lines(config).len() as f32 * size * config.line_height
            }
            BlockContent::Image { height, .. } | BlockContent::Gauge { height, .. } => *height,
        }
    }

    /// Height of the first line of text, or of the whole block otherwise.
    fn leading_height(&self, config: &PageConfig) -> f32 {
        match &self.content {
            BlockContent::Text { size, .. } => size * config.line_height,
            _ => self.required_height(config),
        }
    }
}

/// Current write position. Passed into and returned from every placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutCursor {
    pub page: usize,
    pub x: f32,
    pub y: f32,
}

impl LayoutCursor {
    /// The top-left of the content area on `page`.
    pub fn top_of(page: usize, config: &PageConfig) -> Self {
        Self {
            page,
            x: config.margin,
            y: config.content_top(),
        }
    }
}

/// Flow state of the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    /// The cursor is valid and room remains on the current page.
    Positioning,
    /// The next block does not fit; the current page must be finalized.
    PageBreakPending,
    /// Every block has been placed.
    Done,
}

/// Footer content stamped on every page.
#[derive(Debug, Clone, PartialEq)]
pub struct Footer {
    /// Lines printed on the left, above the page number.
    pub notes: Vec<String>,
    /// Lines inside the seal box on the right.
    pub seal: Vec<String>,
}

/// Places blocks onto pages. Owns the pages it produces.
pub struct LayoutEngine<'a> {
    config: &'a PageConfig,
    pages: Vec<Page>,
    current: Page,
    state: FlowState,
}

impl<'a> LayoutEngine<'a> {
    /// Start a layout on a blank first page. Rejects unusable geometry.
    pub fn new(config: &'a PageConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pages: Vec::new(),
            current: Page::new(0, config.page_width, config.page_height),
            state: FlowState::Positioning,
        })
    }

    pub fn start(&self) -> LayoutCursor {
        LayoutCursor::top_of(0, self.config)
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    /// Place `block` at `cursor`, breaking the page first if it does not fit.
    ///
    /// `next` is the block that will follow, used to keep titles with their
    /// content. Returns the cursor advanced past the block. A cursor above the
    /// content area is pulled down to its top; one on another page is rejected.
    pub fn place(
        &mut self,
        mut cursor: LayoutCursor,
        block: &Block,
        next: Option<&Block>,
    ) -> Result<LayoutCursor> {
        if cursor.page != self.current.index {
            return Err(VerifdocError::InvalidPageConfig(format!(
                "cursor is on page {} but the layout is on page {}",
                cursor.page + 1,
                self.current.index + 1
            )));
        }
        cursor.y = cursor.y.min(self.config.content_top());

        let required = block.required_height(self.config);
        let available = self.config.usable_height();
        if required > available {
            return Err(VerifdocError::BlockTooLarge {
                block: block.id.clone(),
                required,
                available,
            });
        }

        let mut needed = required;
        if block.keep_with_next {
            if let Some(next) = next {
                needed += self.config.block_spacing + next.leading_height(self.config);
            }
        }
        let needed = needed.min(available);

        let mut gap = if cursor.y >= self.config.content_top() {
            0.0
        } else {
            block.space_before
        };

        self.state = if cursor.y - gap - needed < self.config.content_floor() {
            FlowState::PageBreakPending
        } else {
            FlowState::Positioning
        };
        if self.state == FlowState::PageBreakPending {
            cursor = self.break_page();
            gap = 0.0;
            self.state = FlowState::Positioning;
        }

        cursor.y -= gap;
        self.draw(cursor, block);
        debug!(block = %block.id, page = cursor.page, top = cursor.y, required, "block placed");

        cursor.y -= required + self.config.block_spacing;
        Ok(cursor)
    }

    /// Finalize the current page and return a cursor at the top of the next.
    fn break_page(&mut self) -> LayoutCursor {
        let next_index = self.current.index + 1;
        let finished = std::mem::replace(
            &mut self.current,
            Page::new(next_index, self.config.page_width, self.config.page_height),
        );
        info!(page = finished.index, commands = finished.commands.len(), "page finalized");
        self.pages.push(finished);
        LayoutCursor::top_of(next_index, self.config)
    }

    fn draw(&mut self, cursor: LayoutCursor, block: &Block) {
        match &block.content {
            BlockContent::Text {
                size,
                style,
                indent,
                ..
            } => {
                let advance = size * self.config.line_height;
                for (i, line) in block.lines(self.config).into_iter().enumerate() {
                    if line.is_empty() {
                        continue;
                    }
                    let baseline = cursor.y - i as f32 * advance - size;
                    self.current.commands.push(DrawCommand::Text {
                        content: line,
                        position: Point::new(cursor.x + indent, baseline),
                        size: *size,
                        style: *style,
                    });
                }
            }
            BlockContent::Image {
                asset,
                width,
                height,
            } => self.current.commands.push(DrawCommand::Image {
                asset: asset.clone(),
                position: Point::new(cursor.x, cursor.y - height),
                width: *width,
                height: *height,
            }),
            BlockContent::Gauge { fraction, height } => {
                self.current.commands.push(DrawCommand::Gauge {
                    position: Point::new(cursor.x, cursor.y - height),
                    width: self.config.content_width(),
                    height: *height,
                    fraction: *fraction,
                })
            }
        }
    }

    /// Finalize the last page and stamp the footer on every page.
    pub fn finish(mut self, footer: Option<&Footer>) -> Vec<Page> {
        self.state = FlowState::Done;
        self.pages.push(self.current);

        if let Some(footer) = footer {
            if self.config.footer_height > 0.0 {
                let total = self.pages.len();
                for page in &mut self.pages {
                    stamp_footer(page, total, footer, self.config);
                }
            }
        }

        info!(pages = self.pages.len(), "layout complete");
        self.pages
    }
}

/// Draw the footer band `[margin_bottom, margin_bottom + footer_height]`.
fn stamp_footer(page: &mut Page, total: usize, footer: &Footer, config: &PageConfig) {
    let bottom = config.margin_bottom;
    let top = config.content_floor();

    page.commands.push(DrawCommand::Rule {
        position: Point::new(config.margin, top),
        length: config.content_width(),
    });

    let advance = FOOTER_TEXT_SIZE * config.line_height;
    let numbering = format!("Page {} of {}", page.index + 1, total);
    let lines = footer
        .notes
        .iter()
        .map(|note| sanitize(note))
        .chain(std::iter::once(numbering));
    for (i, content) in lines.enumerate() {
        let baseline = top - (i + 1) as f32 * advance;
        if baseline < bottom {
            break;
        }
        page.commands.push(DrawCommand::Text {
            content,
            position: Point::new(config.margin, baseline),
            size: FOOTER_TEXT_SIZE,
            style: TextStyle::Muted,
        });
    }

    let seal_height = SEAL_HEIGHT.min(config.footer_height - 2.0);
    if seal_height > 0.0 {
        let seal_width = SEAL_WIDTH.min(config.content_width());
        page.commands.push(DrawCommand::StampBlock {
            position: Point::new(config.page_width - config.margin - seal_width, bottom),
            width: seal_width,
            height: seal_height,
            lines: footer.seal.iter().map(|line| sanitize(line)).collect(),
        });
    }
}

/// Lay out a whole block sequence into finished pages.
#[instrument(skip_all, fields(blocks = blocks.len()))]
pub fn layout_blocks(
    blocks: &[Block],
    config: &PageConfig,
    footer: Option<&Footer>,
) -> Result<Vec<Page>> {
    let mut engine = LayoutEngine::new(config)?;
    let mut cursor = engine.start();
    for (i, block) in blocks.iter().enumerate() {
        cursor = engine.place(cursor, block, blocks.get(i + 1))?;
    }
    Ok(engine.finish(footer))
}

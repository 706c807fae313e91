//! Scrolling text
//!
//! Text is rendered once into an offscreen layout with one module per
//! character, stored right to left. Every step copies the visible window
//! from the offscreen layout onto one row of the live display, sends the
//! frame, shifts the offscreen layout one column and waits
//! `1000 / columns_per_second` milliseconds.
//!
//! ```text
//!   Idle ──run()──▶ Running ──pass done, not looping──▶ Idle
//!                     │  ▲
//!                     └──┘ pass done, looping
//! ```
//!
//! Cancellation is checked between steps and raced against the inter-frame
//! delay. A frame that has started is always sent in full.

use core::cell::Cell;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use heapless::Vec;

use dotchain_hal::ChainBus;

use crate::bitmap::{Bitmap, BLANK, COLUMNS};
use crate::display::MatrixDisplay;
use crate::error::{DisplayError, Error};
use crate::glyph::GlyphSource;
use crate::layout::{Layout, MAX_MODULES};

/// Scroll engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScrollState {
    /// No animation in progress
    #[default]
    Idle,
    /// Animation running
    Running,
}

/// What to scroll and how
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest<'a> {
    /// Text to scroll
    pub text: &'a str,
    /// Scroll speed, at least 1
    pub columns_per_second: u16,
    /// Repeat until cancelled
    pub looping: bool,
    /// Declared display row to scroll on
    pub row: usize,
}

impl<'a> ScrollRequest<'a> {
    /// Scroll `text` once along row 0
    pub const fn new(text: &'a str, columns_per_second: u16) -> Self {
        Self {
            text,
            columns_per_second,
            looping: false,
            row: 0,
        }
    }

    /// Repeat until cancelled
    pub const fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Scroll along declared row `row`
    pub const fn on_row(mut self, row: usize) -> Self {
        self.row = row;
        self
    }

    /// Delay between two steps
    pub const fn step_ms(&self) -> u32 {
        1000 / self.columns_per_second as u32
    }
}

/// Result of a finished or cancelled scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScrollOutcome {
    /// Frames sent
    pub steps: u32,
    /// Passes started, including a cancelled one
    pub passes: u32,
    /// Stopped by the cancel signal
    pub cancelled: bool,
}

/// Scroll animation driver
///
/// [`run`](Self::run) borrows the scroller shared, so [`state`](Self::state)
/// can be read from the delay or another task on the same executor while a
/// scroll is in flight.
#[derive(Debug, Default)]
pub struct Scroller {
    state: Cell<ScrollState>,
}

impl Scroller {
    /// Create an idle scroller
    pub const fn new() -> Self {
        Self {
            state: Cell::new(ScrollState::Idle),
        }
    }

    /// Current state
    pub fn state(&self) -> ScrollState {
        self.state.get()
    }

    /// Scroll `request.text` across one row of `display`
    ///
    /// Returns once the text has left the screen (not looping), when
    /// `cancel` is signalled, or on the first transport error. Input is
    /// validated before anything is written.
    pub async fn run<B, G, D, M>(
        &self,
        display: &mut MatrixDisplay<B, G>,
        request: &ScrollRequest<'_>,
        delay: &mut D,
        cancel: &Signal<M, ()>,
    ) -> Result<ScrollOutcome, DisplayError<B::Error>>
    where
        B: ChainBus,
        G: GlyphSource,
        D: DelayNs,
        M: RawMutex,
    {
        let plan = ScrollPlan::new(display, request)?;

        let _running = RunningGuard::enter(&self.state);
        plan.execute(display, request, delay, cancel).await
    }
}

/// Scroll once with a temporary [`Scroller`]
pub async fn scroll_text<B, G, D, M>(
    display: &mut MatrixDisplay<B, G>,
    text: &str,
    columns_per_second: u16,
    looping: bool,
    row: usize,
    delay: &mut D,
    cancel: &Signal<M, ()>,
) -> Result<ScrollOutcome, DisplayError<B::Error>>
where
    B: ChainBus,
    G: GlyphSource,
    D: DelayNs,
    M: RawMutex,
{
    let request = ScrollRequest::new(text, columns_per_second)
        .looping(looping)
        .on_row(row);
    Scroller::new().run(display, &request, delay, cancel).await
}

/// Resets the state to idle when the run ends or its future is dropped
struct RunningGuard<'a>(&'a Cell<ScrollState>);

impl<'a> RunningGuard<'a> {
    fn enter(state: &'a Cell<ScrollState>) -> Self {
        state.set(ScrollState::Running);
        Self(state)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(ScrollState::Idle);
    }
}

/// Validated glyphs and window geometry for one scroll
struct ScrollPlan {
    /// Glyphs of the full text, left to right
    glyphs: Vec<Bitmap, MAX_MODULES>,
    /// Glyph range of the text with surrounding whitespace removed
    trimmed: core::ops::Range<usize>,
    /// Modules in the live row
    window: usize,
    /// Glyph for the space character, used to pad looping passes
    padding: Bitmap,
}

impl ScrollPlan {
    fn new<B: ChainBus, G: GlyphSource>(
        display: &MatrixDisplay<B, G>,
        request: &ScrollRequest<'_>,
    ) -> Result<Self, Error> {
        let window = display.layout().row(request.row)?.len();
        if request.columns_per_second == 0 {
            return Err(Error::InvalidScrollSpeed);
        }

        let mut glyphs: Vec<Bitmap, MAX_MODULES> = Vec::new();
        for ch in request.text.chars() {
            let glyph = display.glyphs().glyph(ch)?;
            glyphs.push(glyph).map_err(|_| Error::LayoutTooLarge)?;
        }

        // Later passes are padded to text length plus window width
        if request.looping && glyphs.len() + window > MAX_MODULES {
            return Err(Error::LayoutTooLarge);
        }

        let padding = if request.looping {
            display.glyphs().glyph(' ')?
        } else {
            BLANK
        };

        let leading = request.text.chars().take_while(|c| c.is_whitespace()).count();
        let trimmed_len = request.text.trim().chars().count();

        Ok(Self {
            glyphs,
            trimmed: leading..leading + trimmed_len,
            window,
            padding,
        })
    }

    /// Offscreen layout for pass number `pass`
    ///
    /// The first pass holds the text as given. Later passes hold the trimmed
    /// text left-padded with spaces so the next repetition enters from the
    /// right edge.
    fn offscreen(&self, pass: u32) -> Result<Layout, Error> {
        let (pad, text) = if pass == 0 {
            (0, &self.glyphs[..])
        } else {
            let text = &self.glyphs[self.trimmed.clone()];
            (self.glyphs.len() + self.window - text.len(), text)
        };

        let mut layout = Layout::single_row(pad + text.len())?;
        let visual = core::iter::repeat(&self.padding).take(pad).chain(text);
        // Reversed: shift_left carries columns to the next stored module
        for (canvas, bitmap) in layout.modules_mut().rev().zip(visual) {
            canvas.set_bitmap(*bitmap);
        }
        Ok(layout)
    }

    async fn execute<B, G, D, M>(
        &self,
        display: &mut MatrixDisplay<B, G>,
        request: &ScrollRequest<'_>,
        delay: &mut D,
        cancel: &Signal<M, ()>,
    ) -> Result<ScrollOutcome, DisplayError<B::Error>>
    where
        B: ChainBus,
        G: GlyphSource,
        D: DelayNs,
        M: RawMutex,
    {
        let step_ms = request.step_ms();
        let mut outcome = ScrollOutcome::default();

        info!(
            "scroll start: {=usize} chars, {=u16} col/s, looping {=bool}",
            self.glyphs.len(),
            request.columns_per_second,
            request.looping
        );

        loop {
            let mut offscreen = self.offscreen(outcome.passes)?;
            let steps = offscreen.module_count() * COLUMNS;
            outcome.passes += 1;
            debug!("scroll pass {=u32}: {=usize} steps", outcome.passes, steps);

            for _ in 0..steps {
                if cancel.try_take().is_some() {
                    outcome.cancelled = true;
                    break;
                }

                let source = offscreen.modules();
                for (k, canvas) in display.layout_mut().row_mut(request.row)?.enumerate() {
                    match source.len().checked_sub(k + 1) {
                        Some(position) => canvas.copy_from(&source[position]),
                        None => canvas.clear(),
                    }
                }
                display.update_screen()?;
                offscreen.shift_left();
                outcome.steps += 1;

                if let Either::First(()) = select(cancel.wait(), delay.delay_ms(step_ms)).await {
                    outcome.cancelled = true;
                    break;
                }
            }

            if outcome.cancelled {
                info!("scroll cancelled after {=u32} steps", outcome.steps);
                break;
            }
            // An empty pass would repeat forever
            if !request.looping || steps == 0 {
                info!("scroll done: {=u32} steps", outcome.steps);
                break;
            }
        }

        Ok(outcome)
    }
}

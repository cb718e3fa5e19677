//! Effect chain composition as seen through text blocks and the public API.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use ascii_fx::core::ManualClock;
use ascii_fx::effects::{EffectContext, EffectOutput, RichText, from_fn};
use ascii_fx::render::{Animated, EventKind, RenderMode, TextBlock, TextBlockConfig};
use ascii_fx::surface::{BufferSurface, Content};
use ascii_fx::types::{Cell, Extent, StyledText};
use ascii_fx::{AsciiFx, EffectOptions, FxConfig};

fn setup(text: &str) -> (AsciiFx, ManualClock, Rc<RefCell<BufferSurface>>) {
    let clock = ManualClock::new(0.0);
    let fx = AsciiFx::with_clock(FxConfig::default(), clock.clone());
    let surface = Rc::new(RefCell::new(BufferSurface::with_text(text)));
    (fx, clock, surface)
}

fn mark(ch: char) -> StyledText {
    StyledText {
        lines: vec![vec![Cell::plain(ch)]],
    }
}

#[test]
fn rich_then_plain_keeps_rich_write() {
    let (mut fx, clock, surface) = setup("ab");
    let block = fx.create_text(surface.clone()).unwrap();

    let seen = Rc::new(RefCell::new(String::new()));
    block.use_effect(
        from_fn("paint", |_: &str, _: f64, _: &mut EffectContext<'_>| {
            EffectOutput::Rich(RichText {
                text: "projection".into(),
                styled: mark('R'),
            })
        }),
        EffectOptions::default(),
    );
    {
        let seen = seen.clone();
        block.use_effect(
            from_fn("tail", move |text: &str, _: f64, _: &mut EffectContext<'_>| {
                *seen.borrow_mut() = text.to_string();
                EffectOutput::Plain("tail output".into())
            }),
            EffectOptions::APPEND,
        );
    }
    block.play();

    clock.advance(16.0);
    fx.frame().unwrap();

    assert_eq!(*seen.borrow(), "projection");
    assert_eq!(block.text(), "tail output");
    assert_eq!(surface.borrow().content(), &Content::Styled(mark('R')));
}

#[test]
fn replace_clears_previous_effects() {
    let (mut fx, clock, surface) = setup("AB\nCD");
    let block = fx.create_text(surface.clone()).unwrap();

    block.use_effect(
        from_fn("lower", |text: &str, _: f64, _: &mut EffectContext<'_>| {
            EffectOutput::Plain(text.to_lowercase())
        }),
        EffectOptions::default(),
    );
    block.use_effect(
        from_fn("flip", |text: &str, _: f64, _: &mut EffectContext<'_>| {
            EffectOutput::Plain(text.split('\n').rev().collect::<Vec<_>>().join("\n"))
        }),
        EffectOptions::default(),
    );
    block.play();

    clock.advance(16.0);
    fx.frame().unwrap();

    assert_eq!(block.instance().borrow().base().effects().names(), ["flip"]);
    assert_eq!(surface.borrow().content(), &Content::Text("CD\nAB".into()));
}

#[test]
fn play_pause_play_restarts_elapsed() {
    let (mut fx, clock, surface) = setup("x");
    let block = fx.create_text(surface).unwrap();

    let elapsed = Rc::new(RefCell::new(Vec::new()));
    {
        let elapsed = elapsed.clone();
        block.use_effect(
            from_fn("clock", move |text: &str, e: f64, _: &mut EffectContext<'_>| {
                elapsed.borrow_mut().push(e);
                EffectOutput::Plain(text.to_string())
            }),
            EffectOptions::default(),
        );
    }

    block.play();
    clock.set(100.0);
    fx.frame().unwrap();
    clock.set(300.0);
    fx.frame().unwrap();

    block.pause();
    clock.set(500.0);
    fx.frame().unwrap();

    block.play();
    clock.set(700.0);
    fx.frame().unwrap();
    clock.set(750.0);
    fx.frame().unwrap();

    assert_eq!(*elapsed.borrow(), vec![0.0, 200.0, 0.0, 50.0]);
}

#[test]
fn lifecycle_events_reach_subscribers_in_order() {
    let (mut fx, _, surface) = setup("x");
    let block = fx.create_text(surface).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));

    for kind in [EventKind::Start, EventKind::Pause, EventKind::Stop, EventKind::Destroy] {
        for tag in ["first", "second"] {
            let log = log.clone();
            block.on(kind, move |event| {
                log.borrow_mut().push(format!("{}:{tag}", event.kind));
            });
        }
    }
    block.on(EventKind::Start, |_| panic!("subscriber failure"));

    block.play().pause().stop();
    let id = block.id();
    assert!(fx.destroy(&id));

    assert_eq!(
        *log.borrow(),
        [
            "start:first",
            "start:second",
            "pause:first",
            "pause:second",
            "stop:first",
            "stop:second",
            // destroy stops the block again before announcing itself
            "stop:first",
            "stop:second",
            "destroy:first",
            "destroy:second",
        ]
    );
}

#[test]
fn large_art_switches_to_glyph_mode() {
    let art: String = (0..120).map(|i| format!("line {i:03}")).collect::<Vec<_>>().join("\n");
    let surface = Rc::new(RefCell::new(BufferSurface::with_text(&art)));
    let mut block = TextBlock::new("text-1", surface.clone(), TextBlockConfig::default()).unwrap();
    assert!(block.is_glyph_mode());

    block.play();
    block.update(16.0, 16.0).unwrap();
    let Content::Glyphs { lines, extent } = surface.borrow().content().clone() else {
        panic!("expected a glyph draw");
    };
    assert_eq!(lines.len(), 120);
    assert_eq!(extent, Extent::new(8, 120));

    let small = Rc::new(RefCell::new(BufferSurface::with_text("tiny")));
    let text_mode = TextBlock::new(
        "text-2",
        small,
        TextBlockConfig {
            render_mode: RenderMode::Auto,
            threshold: 100,
        },
    )
    .unwrap();
    assert!(!text_mode.is_glyph_mode());
}

#[test]
fn builtin_effects_through_the_api() {
    let (mut fx, clock, surface) = setup("hello world");
    let block = fx.create_text(surface.clone()).unwrap();
    block
        .effect("typewriter", &json!({ "speed": 10, "show_cursor": false }))
        .unwrap()
        .effect("color_cycle", &json!(null))
        .unwrap()
        .play();

    clock.set(10.0);
    fx.frame().unwrap();
    clock.set(60.0);
    fx.frame().unwrap();

    assert_eq!(block.text(), "hello");
    assert!(surface.borrow().is_styled());
}

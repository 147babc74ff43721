//! Display behavior seen from viewers
//!
//! A viewer attached from the start replays the live instruction stream; a
//! viewer joining late replays a resync. Both must end up showing exactly
//! what the display has flushed.

mod common;

use std::io::BufReader;

use common::{mirrored, resynced, write};
use mochi_display::{
    read_json_lines, Cell, CellAttributes, Color, Display, DisplayError, Instruction,
    JsonLinesChannel, MirrorSurface, Replica, Rgb,
};

type MirroredDisplay = Display<MirrorSurface<Vec<Instruction>>>;

/// Replica of a viewer that has been attached since construction
fn live_view(display: &MirroredDisplay) -> Replica {
    let mut replica = Replica::new();
    replica.apply_all(display.surface().channel().iter());
    replica
}

fn assert_matches_display(replica: &Replica, display: &MirroredDisplay) {
    assert_eq!(replica.geometry(), display.geometry());
    assert_eq!(replica.glyphs(), display.visible_glyphs());
    assert_eq!(replica.highlight(), display.highlight().as_ref());
}

/// Writes, scrolls, colors and a selection
fn busy_session(display: &mut MirroredDisplay) {
    write(display, 0, 0, "first line");
    write(display, 1, 0, "second line");
    display.flush();

    display.set_glyph_colors(Color::Indexed(2), Color::Indexed(4));
    let mut attrs = CellAttributes::new();
    attrs.bold = true;
    let green = display.glyph_cell('g', attrs);
    display.record_set(2, 3, 9, &green);
    display.flush();

    // Scroll up one row and fill the bottom
    display.record_copy_rows(1, 4, -1);
    display.record_set(3, 0, 12, &Cell::blank());
    write(display, 3, 0, "new bottom");
    display.flush();

    // Insert two characters in the middle of row 0
    display.record_copy(0, 2, 10, 2);
    write(display, 0, 2, "++");
    display.flush();

    display.assign_color(4, Rgb::new(10, 20, 30)).expect("valid index");
    display.select(2, 5, 0, 1);
    display.flush();
}

#[test]
fn test_live_view_matches_display() {
    let mut display = mirrored(12, 4);
    busy_session(&mut display);
    assert_eq!(
        display.screen_text(),
        "se++cond lin\n   gggggg   \n            \nnew bottom  "
    );
    assert_matches_display(&live_view(&display), &display);
}

#[test]
fn test_resync_matches_display() {
    let mut display = mirrored(12, 4);
    busy_session(&mut display);

    let replica = resynced(&display);
    assert_matches_display(&replica, &display);
    assert_eq!(replica.palette(), &display.palette().colors()[..]);
    assert_eq!(
        replica.default_colors(),
        (
            display.palette().default_foreground(),
            display.palette().default_background()
        )
    );
    assert_eq!(replica.sync_count(), 1);
}

#[test]
fn test_resync_then_live_updates() {
    let mut display = mirrored(10, 3);
    write(&mut display, 0, 0, "before");
    display.flush();

    let mut replica = resynced(&display);
    let joined_at = display.surface().channel().len();

    display.record_copy_rows(0, 2, 1);
    write(&mut display, 0, 0, "after");
    display.select(0, 0, 1, 4);
    display.flush();
    display.resize(8, 4).expect("resize");
    write(&mut display, 3, 0, "grown");
    display.flush();

    replica.apply_all(display.surface().channel()[joined_at..].iter());
    assert_matches_display(&replica, &display);
}

#[test]
fn test_resync_ignores_pending_operations() {
    let mut display = mirrored(6, 2);
    write(&mut display, 0, 0, "kept");
    display.flush();
    write(&mut display, 1, 0, "queued");
    display.record_copy_rows(0, 1, 1);

    let replica = resynced(&display);
    assert_eq!(replica.screen_text(), "kept  \n      ");
    assert!(display.operations().is_pending());

    display.flush();
    assert_eq!(display.screen_text(), "kept  \nkept  ");
}

#[test]
fn test_resync_over_json_lines() {
    let mut display = mirrored(8, 2);
    write(&mut display, 0, 0, "中");
    display.record_set(
        0,
        1,
        2,
        &Cell::continuation(Color::Default, Color::Default, CellAttributes::new()),
    );
    write(&mut display, 1, 0, "json");
    display.select(1, 0, 1, 3);
    display.flush();

    let mut channel = JsonLinesChannel::new(Vec::new());
    display.dup("json-viewer", &mut channel).expect("dup");
    let bytes = channel.into_inner();
    let instructions = read_json_lines(BufReader::new(bytes.as_slice())).expect("parse");
    assert_eq!(instructions.last(), Some(&Instruction::Sync));

    let mut replica = Replica::new();
    replica.apply_all(instructions.iter());
    assert_matches_display(&replica, &display);
    assert_eq!(replica.row_text(0), "中      ");
}

#[test]
fn test_resync_to_several_viewers_on_one_channel() {
    let mut display = mirrored(4, 1);
    write(&mut display, 0, 0, "abcd");
    display.flush();

    let (mut tx, rx) = std::sync::mpsc::channel();
    display.dup("alice,bob", &mut tx).expect("dup");
    drop(tx);

    let stream: Vec<Instruction> = rx.iter().collect();
    let mut alice = Replica::new();
    let mut bob = Replica::new();
    alice.apply_all(stream.iter());
    bob.apply_all(stream.iter());
    assert_eq!(alice, bob);
    assert_eq!(alice.screen_text(), "abcd");
}

#[test]
fn test_resize_discards_pending_preserves_committed() {
    let mut display = mirrored(6, 3);
    write(&mut display, 1, 1, "stay");
    display.flush();

    write(&mut display, 0, 0, "X");
    display.resize(5, 2).expect("resize");
    display.flush();

    assert_eq!(display.screen_text(), "     \n stay");
    assert_matches_display(&live_view(&display), &display);
}

#[test]
fn test_flush_twice_has_no_second_effect() {
    let mut display = mirrored(6, 2);
    write(&mut display, 0, 0, "once");
    display.flush();
    let after_first = display.surface().channel().len();
    display.flush();
    display.flush_operations();
    assert_eq!(display.surface().channel().len(), after_first);
}

#[test]
fn test_set_overlapping_copy_in_one_flush() {
    let mut display = mirrored(6, 1);
    write(&mut display, 0, 0, "abcdef");
    display.flush();

    // A pending set is carried along by a later copy; a set recorded after
    // the copy wins over it.
    write(&mut display, 0, 0, "X");
    display.record_copy(0, 0, 3, 3);
    write(&mut display, 0, 4, "Y");
    display.flush();

    assert_eq!(display.screen_text(), "XbcXYc");
    assert_matches_display(&live_view(&display), &display);
}

#[test]
fn test_font_change_then_resize() {
    let mut display = mirrored(10, 4);
    write(&mut display, 0, 0, "font");
    display.flush();
    let area = (
        display.geometry().pixel_width(),
        display.geometry().pixel_height(),
    );

    let err = display.set_font(Some("fantasy"), None, 96).unwrap_err();
    assert!(matches!(err, DisplayError::UnresolvableFont { .. }));

    display.set_font(None, Some(24), 96).expect("font");
    assert_eq!(display.geometry().width, 10);
    let (cols, rows) = display.geometry().cells_for_pixels(area.0, area.1);
    display.resize(cols, rows).expect("resize");
    display.flush();

    assert_eq!((display.geometry().width, display.geometry().height), (5, 2));
    assert_eq!(display.row_text(0), "font ");
    assert_matches_display(&live_view(&display), &display);
    assert_matches_display(&resynced(&display), &display);
}

#[test]
fn test_custom_default_palette() {
    common::init_tracing();
    let mut table = vec![(0, 0, 0); 256];
    table[1] = (1, 1, 1);
    let config = mochi_display::DisplayConfig {
        columns: 2,
        rows: 1,
        palette: Some(table),
        ..mochi_display::DisplayConfig::default()
    };
    let mut display =
        Display::new(&config, MirrorSurface::new(Vec::new()), common::fonts()).expect("display");
    assert_eq!(display.lookup_color(1).unwrap(), Rgb::new(1, 1, 1));
    display.assign_color(1, Rgb::WHITE).unwrap();
    display.reset_palette();
    assert_eq!(display.lookup_color(1).unwrap(), Rgb::new(1, 1, 1));
    assert!(display.palette().has_custom_defaults());
}

//! Persisted scrollback across connect/disconnect cycles.

use std::fs;

use mudterm_scrollback::ScrollbackBuffer;
use mudterm_text::StyledText;
use proptest::prelude::*;
use tempfile::TempDir;

fn strings(buffer: &mut ScrollbackBuffer) -> Vec<String> {
    buffer.to_lines().iter().map(ToString::to_string).collect()
}

/// Lines either match exactly or, for `Loaded(n)`, are a load banner.
enum Expect {
    Line(&'static str),
    Loaded(usize),
}

fn assert_lines(buffer: &mut ScrollbackBuffer, expected: &[Expect]) {
    let actual = strings(buffer);
    assert_eq!(actual.len(), expected.len(), "lines: {actual:?}");
    for (line, expect) in actual.iter().zip(expected) {
        match expect {
            Expect::Line(text) => assert_eq!(line, text),
            Expect::Loaded(n) => {
                let prefix = format!("^^^ Loaded {n} lines at ");
                assert!(line.starts_with(&prefix), "{line:?} is not a banner for {n}");
                assert!(line.ends_with('\n'));
            }
        }
    }
}

#[test]
fn persist_and_unpersist() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("persist.log");
    fs::write(&path, "Take my love\nTake my land").unwrap();

    let mut buffer = ScrollbackBuffer::new(1000);
    buffer.set_persistent(&path).unwrap();
    assert_lines(
        &mut buffer,
        &[
            Expect::Line("Take my love\n"),
            Expect::Line("Take my land\n"),
            Expect::Loaded(2),
            Expect::Line("\n"),
        ],
    );

    buffer.set_not_persistent().unwrap();
    assert!(!buffer.is_persistent());
    buffer.set_persistent(&path).unwrap();
    assert_lines(
        &mut buffer,
        &[
            Expect::Line("Take my love\n"),
            Expect::Line("Take my land\n"),
            Expect::Loaded(2),
            Expect::Line("\n"),
            Expect::Loaded(4),
            Expect::Line("\n"),
        ],
    );

    buffer.set_not_persistent().unwrap();
    buffer.set_persistent(&path).unwrap();
    assert_lines(
        &mut buffer,
        &[
            Expect::Line("Take my love\n"),
            Expect::Line("Take my land\n"),
            Expect::Loaded(2),
            Expect::Line("\n"),
            Expect::Loaded(4),
            Expect::Line("\n"),
            Expect::Loaded(6),
            Expect::Line("\n"),
        ],
    );
}

#[test]
fn banner_survives_the_round_trip_with_its_flavor() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("flavor.log");
    fs::write(&path, "Take my love\n").unwrap();

    let mut buffer = ScrollbackBuffer::new(100);
    buffer.set_persistent(&path).unwrap();
    buffer.set_not_persistent().unwrap();
    buffer.set_persistent(&path).unwrap();

    let banner = buffer.line(1).clone();
    assert!(banner.to_string().starts_with("^^^ Loaded 1 lines"));
    assert!(banner.flavor_at(0).is_inverse());
}

#[test]
fn connect_and_reconnect_a_lot() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("reconnect.log");
    fs::write(&path, "Take my love\nTake my land").unwrap();

    let mut buffer = ScrollbackBuffer::new(20_000).with_read_cache(16);
    for _ in 0..50 {
        buffer.set_persistent(&path).unwrap();
        for i in 0..buffer.len() {
            buffer.line(i);
        }

        buffer.append_line(&StyledText::plain("Connected."));
        buffer.append_line(&StyledText::plain("Take me where I cannot stand"));
        for i in 0..buffer.len() {
            buffer.line(i);
        }

        buffer.set_not_persistent().unwrap();
        buffer.append_line(&StyledText::plain("Disconnected."));
    }

    // Each cycle saves a banner, a blank line and two connected lines.
    assert_eq!(buffer.len(), 2 + 50 * 4 + 1);
    assert_eq!(buffer.line(0).to_string(), "Take my love\n");
    assert_eq!(buffer.line(buffer.len() - 1).to_string(), "Disconnected.\n");
}

#[test]
fn persistent_buffer_stays_within_capacity() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bounded.log");
    let mut buffer = ScrollbackBuffer::new(4);
    buffer.set_persistent(&path).unwrap();
    for i in 0..10 {
        buffer.append_line(&StyledText::plain(&format!("line {i}")));
        assert!(buffer.len() <= 4);
    }
    assert_eq!(
        strings(&mut buffer),
        ["line 6\n", "line 7\n", "line 8\n", "line 9\n"]
    );

    buffer.flush(usize::MAX).unwrap();
    let mut reopened = ScrollbackBuffer::new(100);
    reopened.set_persistent(&path).unwrap();
    assert_eq!(reopened.line(0).to_string(), "line 6\n");
    assert_eq!(reopened.line(3).to_string(), "line 9\n");
}

proptest! {
    #[test]
    fn memory_buffer_keeps_newest_lines(capacity in 1usize..32, extra in 0usize..32) {
        let mut buffer = ScrollbackBuffer::new(capacity);
        let total = capacity + extra;
        for i in 0..total {
            buffer.append_line(&StyledText::plain(&i.to_string()));
        }
        prop_assert_eq!(buffer.len(), capacity);
        prop_assert_eq!(buffer.line(0).to_string(), format!("{extra}\n"));
    }
}

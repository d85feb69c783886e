use anyhow::Result;
use litmatch::{CompileOptions, MatchOptions, Matcher};

fn opts(f: impl Fn(&mut MatchOptions)) -> MatchOptions {
    let mut o = MatchOptions::default();
    f(&mut o);
    o
}

fn offsets(matches: &[litmatch::Match<'_>]) -> Vec<usize> {
    matches.iter().map(|m| m.offset).collect()
}

fn texts<'h>(matches: &[litmatch::Match<'h>]) -> Vec<&'h [u8]> {
    matches.iter().map(|m| m.bytes).collect()
}

#[test]
fn word_boundary_requires_both_sides() -> Result<()> {
    let m = Matcher::from_buffer(b"in\nand\n", CompileOptions::default())?;
    let hay = b"land and inland";

    let all = m.scan(hay, &MatchOptions::default())?;
    assert!(all.iter().any(|r| r.bytes == b"in"));
    assert!(all.iter().any(|r| r.bytes == b"and"));

    let bounded = m.scan(hay, &opts(|o| o.word_boundary = true))?;
    assert_eq!(bounded.len(), 1);
    assert_eq!(bounded[0].bytes, b"and");
    assert_eq!(bounded[0].offset, 5);
    Ok(())
}

#[test]
fn word_prefix_matches_word_starts_only() -> Result<()> {
    let m = Matcher::from_buffer(b"foo\nbar\n", CompileOptions::default())?;
    let results = m.scan(b"foobar foo barbar", &opts(|o| o.word_prefix = true))?;
    assert_eq!(offsets(&results), vec![0, 7, 11]);
    assert_eq!(texts(&results), vec![b"foo".as_slice(), b"foo", b"bar"]);
    Ok(())
}

#[test]
fn word_suffix_matches_word_ends_only() -> Result<()> {
    let m = Matcher::from_buffer(b"foo\nbar\n", CompileOptions::default())?;
    let results = m.scan(b"foofoo toolbar bar", &opts(|o| o.word_suffix = true))?;
    assert_eq!(offsets(&results), vec![3, 11, 15]);
    assert_eq!(texts(&results), vec![b"foo".as_slice(), b"bar", b"bar"]);
    Ok(())
}

#[test]
fn boundary_implies_prefix_and_suffix() -> Result<()> {
    let m = Matcher::from_buffer(b"foo\nbar\nin\nand\n", CompileOptions::default())?;
    let hay = b"foobar and inland foo-bar in";
    let bounded = m.scan(hay, &opts(|o| o.word_boundary = true))?;
    let prefixed = m.scan(hay, &opts(|o| o.word_prefix = true))?;
    let suffixed = m.scan(hay, &opts(|o| o.word_suffix = true))?;
    for b in &bounded {
        assert!(prefixed.iter().any(|p| (p.offset, p.length) == (b.offset, b.length)));
        assert!(suffixed.iter().any(|s| (s.offset, s.length) == (b.offset, b.length)));
    }
    // The converse does not hold: "foo" heading "foobar" is prefix-only.
    assert!(prefixed.iter().any(|p| p.offset == 0));
    assert!(!bounded.iter().any(|b| b.offset == 0));
    Ok(())
}

#[test]
fn line_start_and_line_end() -> Result<()> {
    let m = Matcher::from_buffer(b"start\nend\nmiddle\n", CompileOptions::default())?;
    let hay = b"start of line\nmiddle start here\nsome middle text\nline end";

    let starts = m.scan(hay, &opts(|o| o.line_start = true))?;
    assert_eq!(offsets(&starts), vec![0, 14]);
    assert_eq!(texts(&starts), vec![b"start".as_slice(), b"middle"]);

    let ends = m.scan(hay, &opts(|o| o.line_end = true))?;
    assert_eq!(offsets(&ends), vec![54]);
    assert_eq!(texts(&ends), vec![b"end".as_slice()]);

    let both = m.scan(
        hay,
        &opts(|o| {
            o.line_start = true;
            o.line_end = true;
        }),
    )?;
    assert!(both.is_empty());
    Ok(())
}

#[test]
fn whole_line_match_needs_both_line_anchors() -> Result<()> {
    let m = Matcher::from_buffer(b"exactline\n", CompileOptions::default())?;
    let hay = b"before\nexactline\nafter";
    let results = m.scan(
        hay,
        &opts(|o| {
            o.line_start = true;
            o.line_end = true;
        }),
    )?;
    assert_eq!(offsets(&results), vec![7]);
    assert_eq!(results[0].length, 9);
    Ok(())
}

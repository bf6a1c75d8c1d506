//! Benchmarks for search operations
//!
//! Run with: cargo bench search

use texit::search::{self, SearchQuery};
use texit::{EditorSession, Position, TextBuffer};

#[global_allocator]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

fn main() {
    divan::main();
}

fn document(line_count: usize) -> String {
    "The quick brown fox jumps over the lazy dog.\n".repeat(line_count)
}

// ============================================================================
// Find
// ============================================================================

#[divan::bench(args = [1_000, 10_000, 100_000])]
fn find_all_literal(bencher: divan::Bencher, line_count: usize) {
    let buffer = TextBuffer::from_text(&document(line_count));
    let Ok(query) = SearchQuery::literal("brown") else {
        return;
    };
    bencher.bench_local(|| divan::black_box(search::find_all(&buffer, &query)));
}

#[divan::bench(args = [1_000, 10_000, 100_000])]
fn find_all_case_insensitive(bencher: divan::Bencher, line_count: usize) {
    let buffer = TextBuffer::from_text(&document(line_count));
    let Ok(query) = SearchQuery::new("the", false, false) else {
        return;
    };
    bencher.bench_local(|| divan::black_box(search::find_all(&buffer, &query)));
}

#[divan::bench(args = [1_000, 10_000])]
fn find_all_regex(bencher: divan::Bencher, line_count: usize) {
    let buffer = TextBuffer::from_text(&document(line_count));
    let Ok(query) = SearchQuery::new(r"\b\w+ox\b", true, true) else {
        return;
    };
    bencher.bench_local(|| divan::black_box(search::find_all(&buffer, &query)));
}

#[divan::bench]
fn find_next_wraps_10k_lines(bencher: divan::Bencher) {
    let buffer = TextBuffer::from_text(&document(10_000));
    let Ok(query) = SearchQuery::literal("quick") else {
        return;
    };
    let from = Position::new(9_999, 10);
    bencher.bench_local(|| divan::black_box(search::find_next(&buffer, &query, from)));
}

// ============================================================================
// Replace
// ============================================================================

#[divan::bench(args = [1_000, 10_000])]
fn replace_all_literal(line_count: usize) {
    let mut session = EditorSession::with_text(&document(line_count));
    let Ok(query) = SearchQuery::literal("lazy") else {
        return;
    };
    divan::black_box(search::replace_all(&mut session, &query, "sleepy").ok());
}

#[divan::bench(args = [1_000, 10_000])]
fn replace_all_regex_groups(line_count: usize) {
    let mut session = EditorSession::with_text(&document(line_count));
    let Ok(query) = SearchQuery::new(r"(\w+) (fox)", true, true) else {
        return;
    };
    divan::black_box(search::replace_all(&mut session, &query, "$2 $1").ok());
}

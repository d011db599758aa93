//! Unified diffs between two rendered manifests.
//!
//! Lines are compared with the linear-space variant of Myers'
//! shortest-edit-script algorithm, then grouped into hunks surrounded by
//! `context` unchanged lines, in the classic `diff -u` layout:
//!
//! ```text
//! --- target
//! +++ pr
//! @@ -3,7 +3,7 @@
//!  spec:
//! -  replicas: 2
//! +  replicas: 3
//! ```

/// Label of the old (target branch) side in diff headers.
pub const OLD_LABEL: &str = "target";
/// Label of the new (PR branch) side in diff headers.
pub const NEW_LABEL: &str = "pr";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit<'a> {
    Equal(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

impl Edit<'_> {
    fn is_equal(&self) -> bool {
        matches!(self, Edit::Equal(_))
    }

    fn consumes_old(&self) -> bool {
        !matches!(self, Edit::Insert(_))
    }

    fn consumes_new(&self) -> bool {
        !matches!(self, Edit::Delete(_))
    }
}

/// Render the unified diff turning `old` into `new`.
///
/// Returns an empty string when both texts have the same lines.
pub fn unified_diff(old: &str, new: &str, context: usize) -> String {
    let a: Vec<&str> = old.lines().collect();
    let b: Vec<&str> = new.lines().collect();
    let edits = myers(&a, &b);

    let hunks = group_hunks(&edits, context);
    if hunks.is_empty() {
        return String::new();
    }

    // old/new line numbers (0-based) reached before each edit
    let mut positions = Vec::with_capacity(edits.len() + 1);
    let (mut old_pos, mut new_pos) = (0usize, 0usize);
    for edit in &edits {
        positions.push((old_pos, new_pos));
        if edit.consumes_old() {
            old_pos += 1;
        }
        if edit.consumes_new() {
            new_pos += 1;
        }
    }
    positions.push((old_pos, new_pos));

    let mut out = format!("--- {OLD_LABEL}\n+++ {NEW_LABEL}\n");
    for (start, end) in hunks {
        let slice = &edits[start..end];
        let old_len = slice.iter().filter(|e| e.consumes_old()).count();
        let new_len = slice.iter().filter(|e| e.consumes_new()).count();
        let (old_start, new_start) = positions[start];

        out.push_str(&format!(
            "@@ -{} +{} @@\n",
            format_range(old_start, old_len),
            format_range(new_start, new_len)
        ));
        for edit in slice {
            let (sign, line) = match edit {
                Edit::Equal(line) => (' ', line),
                Edit::Delete(line) => ('-', line),
                Edit::Insert(line) => ('+', line),
            };
            out.push(sign);
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// `start` is the 0-based line the range begins at.
fn format_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, len),
    }
}

/// Half-open `[start, end)` ranges of `edits` that make up each hunk.
fn group_hunks(edits: &[Edit<'_>], context: usize) -> Vec<(usize, usize)> {
    let changes: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, e)| !e.is_equal())
        .map(|(i, _)| i)
        .collect();

    let Some((&first, rest)) = changes.split_first() else {
        return Vec::new();
    };

    let mut hunks = Vec::new();
    let mut start = first.saturating_sub(context);
    let mut last = first;
    for &idx in rest {
        // unchanged lines between two changes that two contexts cannot bridge
        if idx - last - 1 > 2 * context {
            hunks.push((start, (last + context + 1).min(edits.len())));
            start = idx - context;
        }
        last = idx;
    }
    hunks.push((start, (last + context + 1).min(edits.len())));
    hunks
}

/// Myers' shortest edit script over two line slices.
///
/// Uses the linear-space variant: the middle snake of each subproblem is found
/// with a forward and a backward frontier, then both halves are solved
/// recursively. Memory stays proportional to `a.len() + b.len()` whatever the
/// edit distance. Within each run of changes, deletions come before insertions.
pub fn myers<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<Edit<'a>> {
    let max_d = (a.len() + b.len() + 1) / 2 + 1;
    let mut forward = Frontier::new(max_d);
    let mut backward = Frontier::new(max_d);
    let mut edits = Vec::with_capacity(a.len() + b.len());

    conquer(a, b, &mut forward, &mut backward, &mut edits);

    for run in edits.split_mut(|e| e.is_equal()) {
        run.sort_by_key(|e| matches!(e, Edit::Insert(_)));
    }
    edits
}

/// Furthest-reaching x per diagonal `k`.
struct Frontier {
    offset: isize,
    v: Vec<isize>,
}

impl Frontier {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d + 1],
        }
    }

    fn get(&self, k: isize) -> isize {
        self.v[(k + self.offset) as usize]
    }

    fn set(&mut self, k: isize, x: isize) {
        self.v[(k + self.offset) as usize] = x;
    }
}

fn conquer<'a>(
    a: &[&'a str],
    b: &[&'a str],
    forward: &mut Frontier,
    backward: &mut Frontier,
    edits: &mut Vec<Edit<'a>>,
) {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    edits.extend(a[..prefix].iter().map(|l| Edit::Equal(*l)));
    let (a, b) = (&a[prefix..], &b[prefix..]);

    let suffix = a
        .iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let (mid_a, mid_b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);
    let (n, m) = (mid_a.len(), mid_b.len());

    if mid_a.is_empty() {
        edits.extend(mid_b.iter().map(|l| Edit::Insert(*l)));
    } else if mid_b.is_empty() {
        edits.extend(mid_a.iter().map(|l| Edit::Delete(*l)));
    } else {
        // a split must leave two strictly smaller subproblems
        let split = middle_snake(mid_a, mid_b, forward, backward).filter(|&(x, y)| {
            x <= n && y <= m && (x, y) != (0, 0) && (x, y) != (n, m)
        });
        match split {
            Some((x, y)) => {
                conquer(&mid_a[..x], &mid_b[..y], forward, backward, edits);
                conquer(&mid_a[x..], &mid_b[y..], forward, backward, edits);
            }
            None => {
                edits.extend(mid_a.iter().map(|l| Edit::Delete(*l)));
                edits.extend(mid_b.iter().map(|l| Edit::Insert(*l)));
            }
        }
    }

    edits.extend(a[a.len() - suffix..].iter().map(|l| Edit::Equal(*l)));
}

/// A point on an optimal path through the middle of the edit graph.
///
/// Both inputs must be non-empty and share no first or last line.
fn middle_snake(
    a: &[&str],
    b: &[&str],
    forward: &mut Frontier,
    backward: &mut Frontier,
) -> Option<(usize, usize)> {
    let (n, m) = (a.len() as isize, b.len() as isize);
    let delta = n - m;
    let odd = delta & 1 == 1;
    forward.set(1, 0);
    backward.set(1, 0);

    for d in 0..(n + m + 1) / 2 + 1 {
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && forward.get(k - 1) < forward.get(k + 1)) {
                forward.get(k + 1)
            } else {
                forward.get(k - 1) + 1
            };
            let (x0, y0) = (x, x - k);
            let mut y = y0;
            while x < n && y < m && a[x as usize] == b[y as usize] {
                x += 1;
                y += 1;
            }
            forward.set(k, x);

            if odd && (k - delta).abs() < d && x + backward.get(delta - k) >= n {
                return point(x0, y0);
            }
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && backward.get(k - 1) < backward.get(k + 1)) {
                backward.get(k + 1)
            } else {
                backward.get(k - 1) + 1
            };
            let mut y = x - k;
            while x < n && y < m && a[(n - x - 1) as usize] == b[(m - y - 1) as usize] {
                x += 1;
                y += 1;
            }
            backward.set(k, x);

            if !odd && (k - delta).abs() <= d && x + forward.get(delta - k) >= n {
                return point(n - x, m - y);
            }
        }
    }
    None
}

fn point(x: isize, y: isize) -> Option<(usize, usize)> {
    Some((usize::try_from(x).ok()?, usize::try_from(y).ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_myers_prefers_deletions_before_insertions() {
        let a = vec!["line1", "line2", "line3", "line4"];
        let b = vec!["line2", "line3_modified", "line4", "line5"];

        assert_eq!(
            myers(&a, &b),
            vec![
                Edit::Delete("line1"),
                Edit::Equal("line2"),
                Edit::Delete("line3"),
                Edit::Insert("line3_modified"),
                Edit::Equal("line4"),
                Edit::Insert("line5"),
            ]
        );
    }

    #[test]
    fn test_myers_one_side_empty() {
        assert_eq!(myers(&[], &["a", "b"]), vec![Edit::Insert("a"), Edit::Insert("b")]);
        assert_eq!(myers(&["a"], &[]), vec![Edit::Delete("a")]);
        assert!(myers(&[], &[]).is_empty());
    }

    #[test]
    fn test_common_ends_are_matched_before_the_trace() {
        let a = vec!["head", "x", "tail"];
        let b = vec!["head", "y", "z", "tail"];

        assert_eq!(
            myers(&a, &b),
            vec![
                Edit::Equal("head"),
                Edit::Delete("x"),
                Edit::Insert("y"),
                Edit::Insert("z"),
                Edit::Equal("tail"),
            ]
        );
    }

    #[test]
    fn test_large_addition() {
        let lines: Vec<String> = (0..50_000).map(|i| format!("line {i}")).collect();
        let b: Vec<&str> = lines.iter().map(String::as_str).collect();

        let edits = myers(&["line 0"], &b);

        assert_eq!(edits.len(), 50_000);
        assert_eq!(edits[0], Edit::Equal("line 0"));
        assert!(edits[1..].iter().all(|e| matches!(e, Edit::Insert(_))));
    }

    #[test]
    fn test_scattered_edits_over_a_large_text() {
        let old: Vec<String> = (0..10_000).map(|i| format!("key{i}: value")).collect();
        let new: Vec<String> = (0..10_000)
            .map(|i| {
                if i % 3 == 0 {
                    format!("key{i}: changed")
                } else {
                    format!("key{i}: value")
                }
            })
            .collect();
        let a: Vec<&str> = old.iter().map(String::as_str).collect();
        let b: Vec<&str> = new.iter().map(String::as_str).collect();

        let edits = myers(&a, &b);

        let changed = 10_000usize.div_ceil(3);
        assert_eq!(edits.iter().filter(|e| e.is_equal()).count(), 10_000 - changed);
        assert_eq!(edits.len(), 10_000 + changed);
        assert_eq!(&edits[..3], &[Edit::Delete(a[0]), Edit::Insert(b[0]), Edit::Equal(a[1])]);
    }

    /// Length of the longest common subsequence, by dynamic programming.
    fn lcs_len(a: &[&str], b: &[&str]) -> usize {
        let mut row = vec![0usize; b.len() + 1];
        for x in a {
            let mut diag = 0;
            for (j, y) in b.iter().enumerate() {
                let up = row[j + 1];
                row[j + 1] = if x == y { diag + 1 } else { up.max(row[j]) };
                diag = up;
            }
        }
        row[b.len()]
    }

    proptest! {
        #[test]
        fn prop_edit_script_is_shortest(
            a in proptest::collection::vec("[abcd]", 0..40),
            b in proptest::collection::vec("[abcd]", 0..40),
        ) {
            let a: Vec<&str> = a.iter().map(String::as_str).collect();
            let b: Vec<&str> = b.iter().map(String::as_str).collect();
            let edits = myers(&a, &b);

            let changes = edits.iter().filter(|e| !e.is_equal()).count();
            prop_assert_eq!(changes, a.len() + b.len() - 2 * lcs_len(&a, &b));
        }

        #[test]
        fn prop_edits_rebuild_both_sides(
            a in proptest::collection::vec("[abc]", 0..12),
            b in proptest::collection::vec("[abc]", 0..12),
        ) {
            let a: Vec<&str> = a.iter().map(String::as_str).collect();
            let b: Vec<&str> = b.iter().map(String::as_str).collect();
            let edits = myers(&a, &b);

            let old: Vec<&str> = edits
                .iter()
                .filter_map(|e| match e {
                    Edit::Equal(l) | Edit::Delete(l) => Some(*l),
                    Edit::Insert(_) => None,
                })
                .collect();
            let new: Vec<&str> = edits
                .iter()
                .filter_map(|e| match e {
                    Edit::Equal(l) | Edit::Insert(l) => Some(*l),
                    Edit::Delete(_) => None,
                })
                .collect();
            prop_assert_eq!(old, a);
            prop_assert_eq!(new, b);
        }
    }

    #[test]
    fn test_identical_inputs_have_no_diff() {
        assert_eq!(unified_diff("a\nb\n", "a\nb\n", 3), "");
        assert_eq!(unified_diff("", "", 3), "");
    }

    #[test]
    fn test_single_change_with_context() {
        let old = "1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n";
        let new = "1\n2\n3\n4\nfive\n6\n7\n8\n9\n10\n";

        let diff = unified_diff(old, new, 3);

        assert_eq!(
            diff,
            "--- target\n+++ pr\n@@ -2,7 +2,7 @@\n 2\n 3\n 4\n-5\n+five\n 6\n 7\n 8\n"
        );
    }

    #[test]
    fn test_distant_changes_split_into_hunks() {
        let old = "a\n1\n2\n3\n4\n5\nb\n";
        let new = "A\n1\n2\n3\n4\n5\nB\n";

        let diff = unified_diff(old, new, 1);

        assert_eq!(
            diff,
            "--- target\n+++ pr\n@@ -1,2 +1,2 @@\n-a\n+A\n 1\n@@ -6,2 +6,2 @@\n 5\n-b\n+B\n"
        );
    }

    #[test]
    fn test_close_changes_share_a_hunk() {
        let old = "a\n1\n2\nb\n";
        let new = "A\n1\n2\nB\n";

        let diff = unified_diff(old, new, 1);

        assert_eq!(
            diff,
            "--- target\n+++ pr\n@@ -1,4 +1,4 @@\n-a\n+A\n 1\n 2\n-b\n+B\n"
        );
    }

    #[test]
    fn test_created_app_diffs_against_nothing() {
        let diff = unified_diff("", "kind: Service\nname: api\n", 3);
        assert_eq!(
            diff,
            "--- target\n+++ pr\n@@ -0,0 +1,2 @@\n+kind: Service\n+name: api\n"
        );
    }

    #[test]
    fn test_deleted_app_diffs_to_nothing() {
        let diff = unified_diff("kind: Service\n", "", 3);
        assert_eq!(diff, "--- target\n+++ pr\n@@ -1 +0,0 @@\n-kind: Service\n");
    }
}

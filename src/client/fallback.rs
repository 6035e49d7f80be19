//! Canned answers used when the relay cannot be reached.

use chrono::{ Datelike, NaiveDate };

pub const DSA_TIPS: [&str; 10] = [
    "Practice a few DSA problems every day for steady progress!",
    "Draw diagrams to visualize data structures and algorithms.",
    "Understand time and space complexity for each solution.",
    "Break big problems into smaller subproblems.",
    "Master recursion and iterative approaches.",
    "Learn to debug with print statements and dry runs.",
    "Focus on patterns, not just individual problems.",
    "Review your mistakes and learn from them.",
    "Try to explain your solution to someone else.",
    "Practice coding on paper or a whiteboard!",
];

pub const OFFLINE_REPLY: &str =
    "I can't reach the instructor server right now. While it's offline, pick one topic (arrays, recursion, trees or graphs), solve two easy problems on it and dry-run your solution by hand. Ask me again in a moment!";

const CANNED: &[(&[&str], &str)] = &[
    (
        &["array", "arrays"],
        "Arrays store elements in contiguous memory, so indexing is O(1) while inserting or deleting in the middle is O(n). Start with two pointers, prefix sums and sliding window problems.",
    ),
    (
        &["linked list", "linkedlist"],
        "A linked list is a chain of nodes, each pointing to the next. Insertion at a known node is O(1), access by index is O(n). Practice reversing a list and detecting cycles with fast/slow pointers.",
    ),
    (
        &["tree", "trees", "bst"],
        "Trees are hierarchical: every node has children and there are no cycles. Learn the traversals first (preorder, inorder, postorder, level order); most tree problems are one of them plus recursion.",
    ),
    (
        &["graph", "graphs", "bfs", "dfs"],
        "Graphs are nodes connected by edges. Represent them with adjacency lists, then master BFS (shortest paths in unweighted graphs) and DFS (connectivity, cycle detection, topological sort).",
    ),
    (
        &["dynamic programming", "dp"],
        "Dynamic programming solves overlapping subproblems once and reuses the answers. Define the state, write the recurrence, then choose memoization (top-down) or tabulation (bottom-up).",
    ),
    (
        &["recursion", "recursive"],
        "Recursion solves a problem through smaller copies of itself. Always write the base case first, trust the recursive call, and draw the call tree to see the time complexity.",
    ),
    (
        &["sort", "sorting"],
        "Know merge sort (O(n log n), stable), quick sort (O(n log n) average, in place) and counting sort for small ranges. Many interview problems become easy once the input is sorted.",
    ),
    (
        &["complexity", "big o", "big-o"],
        "Big-O describes how work grows with input size. Count the loops: one pass is O(n), nested passes are O(n^2), halving each step is O(log n). Do not forget the space used by recursion.",
    ),
];

/// Picks a canned answer by keyword, or the generic offline answer.
pub fn canned_reply(prompt: &str) -> &'static str {
    let lowered = prompt.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|w| !w.is_empty())
        .collect();

    CANNED.iter()
        .find(|(keywords, _)| {
            keywords.iter().any(|k| {
                if k.contains(' ') { lowered.contains(k) } else { words.contains(k) }
            })
        })
        .map(|(_, reply)| *reply)
        .unwrap_or(OFFLINE_REPLY)
}

pub fn tip_of_the_day(date: NaiveDate) -> &'static str {
    DSA_TIPS[(date.day() as usize) % DSA_TIPS.len()]
}

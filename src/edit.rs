// edit.rs - Levenshtein distance with operation backtrace
// Classic O(n*m) dynamic programme over characters, normalized by the longer input.

/// Kind of a single edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Replace,
    Insert,
    Delete,
}

/// One edit operation. For replacements `src[src_pos]` becomes `tgt[tgt_pos]`;
/// for deletions `src_pos` is the deleted character; for insertions `tgt_pos`
/// is the inserted character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditOp {
    pub src_pos: usize,
    pub tgt_pos: usize,
    pub kind: EditKind,
}

impl EditOp {
    fn new(src_pos: usize, tgt_pos: usize, kind: EditKind) -> Self {
        Self { src_pos, tgt_pos, kind }
    }
}

/// Result of aligning two character sequences.
#[derive(Debug, Clone)]
pub struct Alignment {
    pub distance: usize,
    /// Distance divided by the longer sequence length (0.0 for two empty inputs).
    pub normalized: f64,
    /// Operations in backtrace order, i.e. from the end of the words towards the start.
    pub ops: Vec<EditOp>,
}

impl Alignment {
    /// For each of the `src_len` source characters, the target position it is
    /// kept or substituted at, or `None` if it was deleted.
    pub fn aligned_positions(&self, src_len: usize) -> Vec<Option<usize>> {
        let mut positions = vec![None; src_len];
        let (mut i, mut j) = (0, 0);
        for op in self.ops.iter().rev() {
            while i < op.src_pos && i < src_len {
                positions[i] = Some(j);
                i += 1;
                j += 1;
            }
            match op.kind {
                EditKind::Replace => {
                    if let Some(slot) = positions.get_mut(i) {
                        *slot = Some(j);
                    }
                    i += 1;
                    j += 1;
                }
                EditKind::Delete => i += 1,
                EditKind::Insert => j += 1,
            }
        }
        while i < src_len {
            positions[i] = Some(j);
            i += 1;
            j += 1;
        }
        positions
    }
}

/// Compute the minimum edit sequence turning `src` into `tgt`.
pub fn align(src: &[char], tgt: &[char]) -> Alignment {
    let n = src.len();
    let m = tgt.len();

    let mut matrix = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        matrix[0][j] = j;
    }

    for i in 1..=n {
        for j in 1..=m {
            matrix[i][j] = if src[i - 1] == tgt[j - 1] {
                matrix[i - 1][j - 1]
            } else {
                1 + matrix[i - 1][j]
                    .min(matrix[i][j - 1])
                    .min(matrix[i - 1][j - 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        if src[i - 1] == tgt[j - 1] {
            i -= 1;
            j -= 1;
        } else if matrix[i][j] == 1 + matrix[i - 1][j - 1] {
            ops.push(EditOp::new(i - 1, j - 1, EditKind::Replace));
            i -= 1;
            j -= 1;
        } else if matrix[i][j] == 1 + matrix[i - 1][j] {
            ops.push(EditOp::new(i - 1, j, EditKind::Delete));
            i -= 1;
        } else {
            ops.push(EditOp::new(i, j - 1, EditKind::Insert));
            j -= 1;
        }
    }
    while i > 0 {
        ops.push(EditOp::new(i - 1, j, EditKind::Delete));
        i -= 1;
    }
    while j > 0 {
        ops.push(EditOp::new(i, j - 1, EditKind::Insert));
        j -= 1;
    }

    let distance = matrix[n][m];
    let longest = n.max(m);
    let normalized = if longest == 0 {
        0.0
    } else {
        distance as f64 / longest as f64
    };

    Alignment {
        distance,
        normalized,
        ops,
    }
}

/// Normalized edit distance between two strings, over characters.
pub fn normalized_distance(src: &str, tgt: &str) -> f64 {
    let src: Vec<char> = src.chars().collect();
    let tgt: Vec<char> = tgt.chars().collect();
    align(&src, &tgt).normalized
}

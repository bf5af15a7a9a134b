/// Iterator over all k-element subsets of a pool, in lexicographic index
/// order. Replaces hand-unrolled nested loops per subset size.
pub struct Combinations<'a> {
    pool: &'a [u8],
    indices: Vec<usize>,
    done: bool,
}

impl<'a> Combinations<'a> {
    pub fn new(pool: &'a [u8], k: usize) -> Self {
        Combinations {
            pool,
            indices: (0..k).collect(),
            done: k == 0 || k > pool.len(),
        }
    }
}

impl<'a> Iterator for Combinations<'a> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Vec<u8>> {
        if self.done {
            return None;
        }
        let current: Vec<u8> = self.indices.iter().map(|&i| self.pool[i]).collect();

        // Advance: find the rightmost index that can still move.
        let k = self.indices.len();
        let n = self.pool.len();
        let mut i = k;
        loop {
            if i == 0 {
                self.done = true;
                break;
            }
            i -= 1;
            if self.indices[i] < n - (k - i) {
                self.indices[i] += 1;
                for j in (i + 1)..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                break;
            }
        }

        Some(current)
    }
}

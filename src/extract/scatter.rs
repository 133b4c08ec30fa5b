use rayon::prelude::*;

use super::scan::{offsets_from_counts, split_by_offsets};

/// Maps output items back to the input item that produced them.
///
/// Input `i` produces `counts[i]` outputs; output `o` is the `visit`-th output of
/// its input.
pub(crate) struct CountingScatter {
    input_offsets: Vec<usize>,
    output_to_input: Vec<usize>,
}

impl CountingScatter {
    pub(crate) fn new(counts: &[usize]) -> Self {
        let input_offsets = offsets_from_counts(counts);
        let total = input_offsets.last().copied().unwrap_or(0);
        let mut output_to_input = vec![0; total];
        split_by_offsets(&mut output_to_input, &input_offsets)
            .into_par_iter()
            .enumerate()
            .for_each(|(input, outputs)| outputs.fill(input));
        Self {
            input_offsets,
            output_to_input,
        }
    }

    /// Total number of outputs.
    pub(crate) fn output_len(&self) -> usize {
        self.output_to_input.len()
    }

    /// (input index, visit index) of output `output`.
    pub(crate) fn input_of(&self, output: usize) -> (usize, usize) {
        let input = self.output_to_input[output];
        (input, output - self.input_offsets[input])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_point_back_to_inputs() {
        let scatter = CountingScatter::new(&[2, 0, 1, 3]);
        assert_eq!(scatter.output_len(), 6);
        let visits: Vec<_> = (0..6).map(|o| scatter.input_of(o)).collect();
        assert_eq!(
            visits,
            vec![(0, 0), (0, 1), (2, 0), (3, 0), (3, 1), (3, 2)]
        );
    }

    #[test]
    fn no_outputs() {
        let scatter = CountingScatter::new(&[0, 0]);
        assert_eq!(scatter.output_len(), 0);
        assert_eq!(CountingScatter::new(&[]).output_len(), 0);
    }
}

//! Aaronson-Gottesman stabilizer tableaus with bit-packed rows.
//!
//! A state on *n* qubits is stored as 2*n* + 1 rows of X and Z bits plus a
//! phase exponent per row: rows `0..n` are destabilizers, rows `n..2n` are
//! stabilizers, and the final row is scratch space for deterministic
//! measurement. Pauli bits are packed 64 per word so the Clifford generators
//! reduce to word-wise boolean updates, per the extended tableau algorithm of
//! [arXiv:quant-ph/0406196](https://arxiv.org/abs/quant-ph/0406196).

use rand::Rng;

/// An *n*-qubit stabilizer state in tableau form, initialised to |0...0⟩.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tableau {
    num_qubits: usize,
    words_per_row: usize,
    /// X bits, `(2n + 1) × words_per_row`, row-major.
    x: Vec<u64>,
    /// Z bits, same layout as `x`.
    z: Vec<u64>,
    /// Phase exponents of i, mod 4; stabilizer rows only take values 0 and 2.
    phase: Vec<u8>,
}

impl Tableau {
    #[must_use]
    pub fn new(num_qubits: usize) -> Self {
        let words_per_row = (num_qubits >> 6) + 1;
        let rows = 2 * num_qubits + 1;
        let mut tableau = Tableau {
            num_qubits,
            words_per_row,
            x: vec![0; rows * words_per_row],
            z: vec![0; rows * words_per_row],
            phase: vec![0; rows],
        };
        for qubit in 0..num_qubits {
            let word = qubit >> 6;
            let mask = 1u64 << (qubit & 63);
            tableau.x[qubit * words_per_row + word] = mask;
            tableau.z[(qubit + num_qubits) * words_per_row + word] = mask;
        }
        tableau
    }

    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    #[inline]
    fn index(&self, row: usize, word: usize) -> usize {
        row * self.words_per_row + word
    }

    #[inline]
    fn x_bit(&self, row: usize, qubit: usize) -> bool {
        self.x[self.index(row, qubit >> 6)] & (1u64 << (qubit & 63)) != 0
    }

    #[inline]
    fn flip_phase(&mut self, row: usize) {
        self.phase[row] = (self.phase[row] + 2) & 3;
    }

    /// Hadamard on qubit `k`: exchanges the X and Z columns.
    pub fn apply_h(&mut self, k: usize) {
        debug_assert!(k < self.num_qubits);
        let word = k >> 6;
        let mask = 1u64 << (k & 63);
        for row in 0..2 * self.num_qubits {
            let i = self.index(row, word);
            let tmp = self.x[i];
            self.x[i] ^= (self.x[i] ^ self.z[i]) & mask;
            self.z[i] ^= (self.z[i] ^ tmp) & mask;
            if self.x[i] & mask != 0 && self.z[i] & mask != 0 {
                self.flip_phase(row);
            }
        }
    }

    /// Phase gate S = Z(π/2) on qubit `k`.
    pub fn apply_s(&mut self, k: usize) {
        debug_assert!(k < self.num_qubits);
        let word = k >> 6;
        let mask = 1u64 << (k & 63);
        for row in 0..2 * self.num_qubits {
            let i = self.index(row, word);
            if self.x[i] & mask != 0 && self.z[i] & mask != 0 {
                self.flip_phase(row);
            }
            self.z[i] ^= self.x[i] & mask;
        }
    }

    /// CNOT with control `a` and target `b`.
    pub fn apply_cx(&mut self, a: usize, b: usize) {
        debug_assert!(a < self.num_qubits && b < self.num_qubits && a != b);
        let (word_a, word_b) = (a >> 6, b >> 6);
        let (mask_a, mask_b) = (1u64 << (a & 63), 1u64 << (b & 63));
        for row in 0..2 * self.num_qubits {
            let ia = self.index(row, word_a);
            let ib = self.index(row, word_b);
            let xa = self.x[ia] & mask_a != 0;
            if xa {
                self.x[ib] ^= mask_b;
            }
            let zb = self.z[ib] & mask_b != 0;
            if zb {
                self.z[ia] ^= mask_a;
            }
            let xb = self.x[ib] & mask_b != 0;
            let za = self.z[ia] & mask_a != 0;
            if xa && zb && xb == za {
                self.flip_phase(row);
            }
        }
    }

    pub fn apply_s_dag(&mut self, k: usize) {
        self.apply_s(k);
        self.apply_s(k);
        self.apply_s(k);
    }

    pub fn apply_z(&mut self, k: usize) {
        self.apply_s(k);
        self.apply_s(k);
    }

    pub fn apply_x(&mut self, k: usize) {
        self.apply_h(k);
        self.apply_z(k);
        self.apply_h(k);
    }

    pub fn apply_y(&mut self, k: usize) {
        // Y = S X S†.
        self.apply_s_dag(k);
        self.apply_x(k);
        self.apply_s(k);
    }

    pub fn apply_sqrt_x(&mut self, k: usize) {
        self.apply_h(k);
        self.apply_s(k);
        self.apply_h(k);
    }

    pub fn apply_sqrt_x_dag(&mut self, k: usize) {
        self.apply_h(k);
        self.apply_s_dag(k);
        self.apply_h(k);
    }

    pub fn apply_sqrt_y(&mut self, k: usize) {
        self.apply_z(k);
        self.apply_h(k);
    }

    pub fn apply_sqrt_y_dag(&mut self, k: usize) {
        self.apply_h(k);
        self.apply_z(k);
    }

    /// C_XYZ: the period-3 Clifford taking X → Y → Z → X.
    pub fn apply_c_xyz(&mut self, k: usize) {
        self.apply_s_dag(k);
        self.apply_h(k);
    }

    /// C_ZYX: the inverse of C_XYZ.
    pub fn apply_c_zyx(&mut self, k: usize) {
        self.apply_h(k);
        self.apply_s(k);
    }

    /// H_XY: exchanges X and Y, negating Z.
    pub fn apply_h_xy(&mut self, k: usize) {
        self.apply_x(k);
        self.apply_s(k);
    }

    /// H_YZ: exchanges Y and Z, negating X.
    pub fn apply_h_yz(&mut self, k: usize) {
        self.apply_sqrt_x(k);
        self.apply_z(k);
    }

    pub fn apply_cz(&mut self, a: usize, b: usize) {
        self.apply_h(b);
        self.apply_cx(a, b);
        self.apply_h(b);
    }

    pub fn apply_cy(&mut self, a: usize, b: usize) {
        self.apply_s_dag(b);
        self.apply_cx(a, b);
        self.apply_s(b);
    }

    pub fn apply_swap(&mut self, a: usize, b: usize) {
        self.apply_cx(a, b);
        self.apply_cx(b, a);
        self.apply_cx(a, b);
    }

    fn row_copy(&mut self, src: usize, dst: usize) {
        for word in 0..self.words_per_row {
            self.x[dst * self.words_per_row + word] = self.x[src * self.words_per_row + word];
            self.z[dst * self.words_per_row + word] = self.z[src * self.words_per_row + word];
        }
        self.phase[dst] = self.phase[src];
    }

    // Overwrite `row` with the observable Z_k.
    fn row_set_z(&mut self, row: usize, k: usize) {
        for word in 0..self.words_per_row {
            self.x[row * self.words_per_row + word] = 0;
            self.z[row * self.words_per_row + word] = 0;
        }
        let idx = self.index(row, k >> 6);
        self.z[idx] = 1u64 << (k & 63);
        self.phase[row] = 0;
    }

    // Phase exponent of the product (row src) * (row dst), mod 4.
    fn row_mul_phase(&self, src: usize, dst: usize) -> u8 {
        let mut exponent: i32 = 0;
        for word in 0..self.words_per_row {
            let xs = self.x[src * self.words_per_row + word];
            let zs = self.z[src * self.words_per_row + word];
            let xd = self.x[dst * self.words_per_row + word];
            let zd = self.z[dst * self.words_per_row + word];
            for bit in 0..64 {
                let mask = 1u64 << bit;
                let (xa, za) = (xs & mask != 0, zs & mask != 0);
                let (xb, zb) = (xd & mask != 0, zd & mask != 0);
                exponent += match (xa, za) {
                    (false, false) => 0,
                    (true, false) => i32::from(zb) * (2 * i32::from(xb) - 1),
                    (true, true) => i32::from(zb) - i32::from(xb),
                    (false, true) => i32::from(xb) * (1 - 2 * i32::from(zb)),
                };
            }
        }
        exponent += i32::from(self.phase[src]) + i32::from(self.phase[dst]);
        (exponent.rem_euclid(4)) as u8
    }

    // Left-multiply row `dst` by row `src`.
    fn row_mul(&mut self, src: usize, dst: usize) {
        self.phase[dst] = self.row_mul_phase(src, dst);
        for word in 0..self.words_per_row {
            self.x[dst * self.words_per_row + word] ^= self.x[src * self.words_per_row + word];
            self.z[dst * self.words_per_row + word] ^= self.z[src * self.words_per_row + word];
        }
    }

    /// Projective Z-basis measurement of qubit `k`.
    ///
    /// The outcome is random (drawn from `rng`) when some stabilizer
    /// anticommutes with Z_k, and deterministic otherwise.
    pub fn measure_z<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) -> bool {
        debug_assert!(k < self.num_qubits);
        let n = self.num_qubits;

        let pivot = (n..2 * n).find(|&row| self.x_bit(row, k));
        if let Some(pivot) = pivot {
            // Random outcome: Z_k anticommutes with the pivot stabilizer.
            let outcome = rng.gen::<bool>();
            self.row_copy(pivot, pivot - n);
            self.row_set_z(pivot, k);
            self.phase[pivot] = if outcome { 2 } else { 0 };
            for row in 0..2 * n {
                if row != pivot - n && self.x_bit(row, k) {
                    self.row_mul(pivot - n, row);
                }
            }
            outcome
        } else {
            // Deterministic outcome: accumulate the relevant stabilizers in
            // the scratch row.
            let scratch = 2 * n;
            let first = (0..n).find(|&row| self.x_bit(row, k)).unwrap_or(0);
            self.row_copy(first + n, scratch);
            for row in first + 1..n {
                if self.x_bit(row, k) {
                    self.row_mul(row + n, scratch);
                }
            }
            self.phase[scratch] != 0
        }
    }

    /// Collapse qubit `k` to |0⟩.
    pub fn reset_z<R: Rng + ?Sized>(&mut self, k: usize, rng: &mut R) {
        if self.measure_z(k, rng) {
            self.apply_x(k);
        }
    }
}

use crate::{codec::Bch, poly::Poly};

// Root finding (Berlekamp-Trace with closed-form low degrees)
//------------------------------------------------------------------------------
//
// Roots are reported as error positions, i.e. the exponent of the inverse of
// each polynomial root, which is what the decode stage maps to bit offsets.

// In-place 16x16 bit-matrix transpose: entry (row r, bit i) moves to
// (row i, bit r)
fn transpose16(rows: &mut [u32; 16]) {
    let mut j = 8;
    let mut mask: u32 = 0x00ff;
    while j != 0 {
        let mut k = 0;
        while k < 16 {
            let t = ((rows[k] >> j) ^ rows[k + j]) & mask;
            rows[k] ^= t << j;
            rows[k + j] ^= t;
            k = (k + j + 1) & !j;
        }
        j >>= 1;
        mask ^= mask << j;
    }
}

#[inline]
fn parity(v: u32) -> u32 {
    v.count_ones() & 1
}

impl Bch {
    pub(crate) fn find_poly_roots(&self, k: u32, mut poly: Poly, out: &mut Vec<u32>) {
        match poly.deg() {
            0 => {}
            1 => self.deg1_roots(&poly, out),
            2 => self.deg2_roots(&poly, out),
            3 => self.deg3_roots(&poly, out),
            4 => self.deg4_roots(&poly, out),
            _ => {
                // Trace exponents are exhausted: no roots to report, the
                // caller flags the count mismatch
                if k > self.m {
                    return;
                }
                match self.factor_poly(k, &mut poly) {
                    Some((g, h)) => {
                        self.find_poly_roots(k + 1, g, out);
                        self.find_poly_roots(k + 1, h, out);
                    }
                    None => self.find_poly_roots(k + 1, poly, out),
                }
            }
        }
    }

    // Split f via gcd(f, Tr_k(X) mod f). None when the trace polynomial
    // yields no proper factor, in which case the recursion moves to k + 1
    // over f unchanged.
    fn factor_poly(&self, k: u32, f: &mut Poly) -> Option<(Poly, Poly)> {
        let gf = &self.gf;
        let tk = self.trace_mod(k, f);
        if tk.deg() == 0 {
            return None;
        }
        let gcd = Poly::gcd(f.clone(), tk, gf);
        if gcd.deg() == 0 || gcd.deg() >= f.deg() {
            return None;
        }
        let q = f.div_rem(&gcd, gf);
        Some((gcd, q))
    }

    // Tr_k(X) mod f = sum of (alpha^k X)^(2^i) mod f over i in 0..m, built
    // by repeated squaring with reduction at every step
    fn trace_mod(&self, k: u32, f: &Poly) -> Poly {
        let gf = &self.gf;
        let mut z = Poly::zero(2 * f.deg() + 1);
        let mut out = Poly::zero(f.deg() + 1);
        z.set_deg(1);
        z.set(1, gf.alpha(k));

        let rep = f.logrep(gf);
        for i in 0..self.m {
            // fold z in and square it in place (descending j keeps every
            // source read ahead of its destination writes)
            for j in (0..=z.deg()).rev() {
                out.set(j, out.coef(j) ^ z.coef(j));
                let sq = gf.sqr(z.coef(j));
                z.set(2 * j, sq);
                z.set(2 * j + 1, 0);
            }
            if z.deg() > out.deg() {
                out.set_deg(z.deg());
            }
            if i < self.m - 1 {
                z.set_deg(2 * z.deg());
                z.rem_assign(f, gf, &rep);
            }
        }
        out.trim();
        out
    }

    // bX + c: position is log(b/c)
    fn deg1_roots(&self, p: &Poly, out: &mut Vec<u32>) {
        let gf = &self.gf;
        if p.coef(0) != 0 {
            out.push((gf.n() - gf.log(p.coef(0)) + gf.log(p.coef(1))) % gf.n());
        }
    }

    // aX^2 + bX + c with a, b, c nonzero: substitute X = (b/a)Z to reach
    // Z^2 + Z + u, u = ac/b^2, and solve by trace decomposition over xi
    fn deg2_roots(&self, p: &Poly, out: &mut Vec<u32>) {
        let gf = &self.gf;
        if p.coef(0) == 0 || p.coef(1) == 0 {
            return;
        }
        let n = gf.n();
        let l0 = gf.log(p.coef(0));
        let l1 = gf.log(p.coef(1));
        let l2 = gf.log(p.coef(2));

        let u = gf.alpha(l0 + l2 + 2 * (n - l1));
        let mut r = 0u16;
        let mut v = u;
        while v != 0 {
            let i = (15 - v.leading_zeros()) as usize;
            r ^= gf.xi(i);
            v ^= 1 << i;
        }
        // r and r + 1 solve Z^2 + Z = u only when Tr(u) = 0
        if gf.sqr(r) ^ r == u {
            out.push((2 * n - l1 - gf.log(r) + l2) % n);
            out.push((2 * n - l1 - gf.log(r ^ 1) + l2) % n);
        }
    }

    // Monic reduction, then multiply by (X + a2) to reach the affine
    // quartic X^4 + (a2^2 + b2)X^2 + (a2 b2 + c2)X + a2 c2 and drop the
    // spurious root a2
    fn deg3_roots(&self, p: &Poly, out: &mut Vec<u32>) {
        let gf = &self.gf;
        if p.coef(0) == 0 {
            return;
        }
        let e3 = p.coef(3);
        let c2 = gf.div(p.coef(0), e3);
        let b2 = gf.div(p.coef(1), e3);
        let a2 = gf.div(p.coef(2), e3);

        let c = gf.mul(a2, c2);
        let b = gf.mul(a2, b2) ^ c2;
        let a = gf.sqr(a2) ^ b2;

        let mut sol = [0u16; 4];
        if self.affine4_roots(a, b, c, &mut sol) == 4 {
            for &x in &sol {
                if x != a2 {
                    out.push(gf.ilog(x));
                }
            }
        }
    }

    // General quartic: normalize monic, clear the linear term with Z = X + e
    // (e^2 = c/a via the exact half-log), then invert Y = 1/Z to land on an
    // affine quartic; every substitution is unwound on the way out
    fn deg4_roots(&self, p: &Poly, out: &mut Vec<u32>) {
        let gf = &self.gf;
        if p.coef(0) == 0 {
            return;
        }
        let e4 = p.coef(4);
        let mut d = gf.div(p.coef(0), e4);
        let mut b = gf.div(p.coef(2), e4);
        let c = gf.div(p.coef(1), e4);
        let a = gf.div(p.coef(3), e4);

        let mut e = 0u16;
        let (pa, pb, pc);
        if a != 0 {
            if c != 0 {
                let f = gf.div(c, a);
                let mut l = gf.log(f);
                if l & 1 == 1 {
                    l += gf.n();
                }
                e = gf.alpha(l / 2);
                // the a e^3 and c e contributions cancel against each other
                d = gf.alpha(2 * l) ^ gf.mul(b, f) ^ d;
                b = gf.mul(a, e) ^ b;
            }
            if d == 0 {
                // Z = 0 would be a repeated root; only simple roots count
                return;
            }
            pa = gf.div(b, d);
            pb = gf.div(a, d);
            pc = gf.inv(d);
        } else {
            pa = b;
            pb = c;
            pc = d;
        }

        let mut sol = [0u16; 4];
        if self.affine4_roots(pa, pb, pc, &mut sol) == 4 {
            for &y in &sol {
                let x = if a != 0 { gf.inv(y) } else { y } ^ e;
                debug_assert!(x != 0, "Affine quartic produced a zero root");
                out.push(gf.ilog(x));
            }
        }
    }

    // All x with x^4 + a x^2 + b x = c, via the m x (m+1) linear system over
    // GF(2) whose columns are the map evaluated on the alpha basis
    fn affine4_roots(&self, a: u16, b: u16, c: u16, sol: &mut [u16; 4]) -> usize {
        let gf = &self.gf;
        let m = self.m as usize;
        let mut rows = [0u32; 16];

        let la = if a != 0 { gf.log(a) } else { 0 };
        let lb = if b != 0 { gf.log(b) } else { 0 };
        for i in 0..m as u32 {
            let mut v = gf.alpha(4 * i) as u32;
            if a != 0 {
                v ^= gf.alpha(la + 2 * i) as u32;
            }
            if b != 0 {
                v ^= gf.alpha(lb + i) as u32;
            }
            rows[i as usize] = v;
        }
        rows[m] = c as u32;

        // after transposition row r holds equation r: variable bits below m,
        // the constant at bit m
        transpose16(&mut rows);
        self.solve_linear_system(&mut rows[..m], sol, 4)
    }

    // Gaussian elimination over the augmented rows, eliminating variable
    // columns MSB to LSB. Rows left without a pivot become free parameters;
    // all 1 << k assignments are enumerated and resolved per pivot row with
    // a parity fold. Returns 0 on contradiction or solution-count mismatch.
    fn solve_linear_system(&self, rows: &mut [u32], sol: &mut [u16], nsol: usize) -> usize {
        let m = self.m as usize;
        debug_assert!(rows.len() == m, "System must have m rows");

        let mut pivots = [(0usize, 0usize); 16];
        let mut free_cols = [0usize; 16];
        let mut np = 0;
        let mut nf = 0;
        let mut r = 0;

        for col in (0..m).rev() {
            let bit = 1u32 << col;
            match (r..m).find(|&i| rows[i] & bit != 0) {
                Some(i) => {
                    rows.swap(r, i);
                    let prow = rows[r];
                    for (i2, row) in rows.iter_mut().enumerate() {
                        if i2 != r && *row & bit != 0 {
                            *row ^= prow;
                        }
                    }
                    pivots[np] = (col, r);
                    np += 1;
                    r += 1;
                }
                None => {
                    free_cols[nf] = col;
                    nf += 1;
                }
            }
        }

        // a surviving nonzero row can only carry the constant bit: the
        // system is inconsistent
        if rows[r..].iter().any(|&row| row != 0) {
            return 0;
        }
        if nsol != 1 << nf {
            return 0;
        }

        for p in 0..nsol {
            let mut x = 0u32;
            for (idx, &col) in free_cols[..nf].iter().enumerate() {
                if (p >> idx) & 1 == 1 {
                    x |= 1 << col;
                }
            }
            // reduced rows only reference free columns, so one parity fold
            // per pivot resolves its variable
            for &(col, row) in &pivots[..np] {
                let v = (rows[row] >> m & 1) ^ parity(rows[row] & x);
                x |= v << col;
            }
            sol[p] = x as u16;
        }
        nsol
    }
}

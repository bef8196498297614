use crate::gf::GaloisField;

// Polynomial over GF(2^m)
//------------------------------------------------------------------------------

// Dense coefficient form: c[i] is the coefficient of X^i and c[deg] != 0,
// except for the zero polynomial which is (deg 0, c[0] = 0). Storage beyond
// deg is scratch and carries no meaning.
#[derive(Debug, Clone)]
pub(crate) struct Poly {
    deg: usize,
    c: Vec<u16>,
}

impl Poly {
    pub fn zero(capacity: usize) -> Self {
        Self { deg: 0, c: vec![0; capacity.max(1)] }
    }

    pub fn from_coefs(coefs: &[u16]) -> Self {
        debug_assert!(!coefs.is_empty(), "Empty coefficient slice");
        let mut p = Self { deg: coefs.len() - 1, c: coefs.to_vec() };
        p.trim();
        p
    }

    #[inline]
    pub fn deg(&self) -> usize {
        self.deg
    }

    #[inline]
    pub fn coef(&self, i: usize) -> u16 {
        self.c[i]
    }

    #[inline]
    pub fn set(&mut self, i: usize, v: u16) {
        self.c[i] = v;
    }

    #[inline]
    pub fn set_deg(&mut self, deg: usize) {
        debug_assert!(deg < self.c.len(), "Degree {deg} exceeds capacity {}", self.c.len());
        self.deg = deg;
    }

    #[inline]
    pub fn trim(&mut self) {
        while self.deg > 0 && self.c[self.deg] == 0 {
            self.deg -= 1;
        }
    }

    // Multiply in place by the linear factor (X + r)
    pub fn mul_assign_linear(&mut self, r: u16, gf: &GaloisField) {
        let d = self.deg;
        if self.c.len() < d + 2 {
            self.c.resize(d + 2, 0);
        }
        self.c[d + 1] = self.c[d];
        for j in (1..=d).rev() {
            self.c[j] = gf.mul(self.c[j], r) ^ self.c[j - 1];
        }
        self.c[0] = gf.mul(self.c[0], r);
        self.deg = d + 1;
    }

    // Log representation of a divisor normalized by its leading coefficient:
    // rep[i] = log(c[i] / c[deg]), or -1 for a zero coefficient
    pub fn logrep(&self, gf: &GaloisField) -> Vec<i32> {
        let l = gf.n() - gf.log(self.c[self.deg]);
        (0..self.deg)
            .map(|i| {
                if self.c[i] != 0 {
                    ((gf.log(self.c[i]) + l) % gf.n()) as i32
                } else {
                    -1
                }
            })
            .collect()
    }

    // In-place remainder: self <- self mod b. The quotient register is left
    // in storage above the remainder (see div_rem).
    pub fn rem_assign(&mut self, b: &Poly, gf: &GaloisField, rep: &[i32]) {
        let d = b.deg;
        debug_assert!(d > 0, "Remainder by a constant polynomial");
        debug_assert!(rep.len() == d, "Log representation length mismatch");
        if self.deg < d {
            return;
        }
        for j in (d..=self.deg).rev() {
            if self.c[j] != 0 {
                let la = gf.log(self.c[j]);
                for (i, &r) in rep.iter().enumerate() {
                    if r >= 0 {
                        self.c[j - d + i] ^= gf.alpha(r as u32 + la);
                    }
                }
            }
        }
        self.deg = d - 1;
        self.trim();
    }

    // Reduce self mod b and return the quotient register, a nonzero scalar
    // multiple of the true quotient (root sets are unaffected by the scale)
    pub fn div_rem(&mut self, b: &Poly, gf: &GaloisField) -> Poly {
        debug_assert!(self.deg >= b.deg, "Division by a higher-degree polynomial");
        let qdeg = self.deg - b.deg;
        let rep = b.logrep(gf);
        self.rem_assign(b, gf, &rep);
        Poly::from_coefs(&self.c[b.deg..=b.deg + qdeg])
    }

    pub fn gcd(mut a: Poly, mut b: Poly, gf: &GaloisField) -> Poly {
        if a.deg < b.deg {
            std::mem::swap(&mut a, &mut b);
        }
        while b.deg > 0 {
            let rep = b.logrep(gf);
            a.rem_assign(&b, gf, &rep);
            std::mem::swap(&mut a, &mut b);
        }
        a
    }

    pub fn eval(&self, x: u16, gf: &GaloisField) -> u16 {
        let mut acc = 0u16;
        for j in (0..=self.deg).rev() {
            acc = gf.mul(acc, x) ^ self.c[j];
        }
        acc
    }
}

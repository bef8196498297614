use crate::{
    codec::Bch,
    encoder::load_ecc_words,
    error::{BchError, BchResult},
    poly::Poly,
};

// Syndromes
//------------------------------------------------------------------------------

impl Bch {
    // S[j] = V(alpha^(j+1)) for j in 0..2t over the ECC bit-polynomial held
    // in self.ecc_buf
    pub(crate) fn compute_syndromes(&mut self) {
        let t2 = 2 * self.t() as usize;
        let ecc_bits = self.ecc_bits();
        let Bch { gf, ecc_buf, syn, .. } = self;

        // Stray bits beyond ecc_bits in the last word must not feed the scan
        let tail = ecc_bits & 31;
        if tail != 0 {
            ecc_buf[ecc_bits / 32] &= !((1u32 << (32 - tail)) - 1);
        }

        syn.fill(0);

        // Only odd-power evaluations are scanned; bit at word offset i is
        // the coefficient of X^(i + s) once s has been stepped down
        let mut s = ecc_bits as i32;
        for &w in ecc_buf.iter() {
            s -= 32;
            let mut poly = w;
            while poly != 0 {
                let i = (31 - poly.leading_zeros()) as i32;
                let e = (i + s) as u32;
                for j in (0..t2).step_by(2) {
                    syn[j] ^= gf.alpha((j as u32 + 1) * e) as u32;
                }
                poly ^= 1 << i;
            }
        }

        // Squaring is linear in characteristic 2: V(a^2j) = V(a^j)^2
        for j in 0..t2 / 2 {
            syn[2 * j + 1] = gf.sqr(syn[j] as u16) as u32;
        }
    }
}

// Berlekamp-Massey
//------------------------------------------------------------------------------

impl Bch {
    // Binary Berlekamp-Massey synthesis of the error locator polynomial.
    // None when the locator degree exceeds t. The loop admits one iteration
    // with deg = t + 1 before rejecting; the final degree check carries the
    // failure decision, so the guard must stay <= t.
    fn compute_error_locator(&self) -> Option<Poly> {
        let t = self.t() as usize;
        let gf = &self.gf;
        let n = gf.n();
        let syn = &self.syn;

        let cap = 2 * t + 1;
        let mut elp = Poly::zero(cap);
        let mut pelp = Poly::zero(cap);
        elp.set(0, 1);
        pelp.set(0, 1);

        let mut d = syn[0];
        let mut pd = 1u32;
        let mut pp: i32 = -1;

        let mut i = 0;
        while i < t && elp.deg() <= t {
            if d != 0 {
                // elp <- elp + (d/pd) * X^(2i - pp) * pelp
                let k = (2 * i as i32 - pp) as usize;
                let prev = elp.clone();
                let scale = gf.log(d as u16) + n - gf.log(pd as u16);
                for j in 0..=pelp.deg() {
                    if pelp.coef(j) != 0 {
                        let l = gf.log(pelp.coef(j));
                        elp.set(j + k, elp.coef(j + k) ^ gf.alpha(scale + l));
                    }
                }
                let deg = pelp.deg() + k;
                if deg > elp.deg() {
                    elp.set_deg(deg);
                    pelp = prev;
                    pd = d;
                    pp = 2 * i as i32;
                } else {
                    // the shifted copy can cancel the recorded leading term
                    elp.trim();
                }
            }
            if i < t - 1 {
                d = syn[2 * i + 2];
                for j in 1..=elp.deg().min(2 * i + 2) {
                    let c = elp.coef(j);
                    let s = syn[2 * i + 2 - j] as u16;
                    if c != 0 && s != 0 {
                        d ^= gf.mul(c, s) as u32;
                    }
                }
            }
            i += 1;
        }

        if elp.deg() > t {
            None
        } else {
            Some(elp)
        }
    }
}

// Decode orchestration
//------------------------------------------------------------------------------

impl Bch {
    // Recompute parity over data, fold in the received parity, and locate
    // the flipped bits. Empty result means the codeword checked out clean.
    pub fn decode(&mut self, data: &[u8], recv_ecc: &[u8]) -> BchResult<Vec<u32>> {
        self.check_payload(data.len())?;
        self.check_ecc(recv_ecc)?;
        self.ecc_buf.fill(0);
        self.encode_buf(data);
        if self.xor_with_recv(recv_ecc) {
            return Ok(Vec::new());
        }
        self.compute_syndromes();
        self.locate(data.len())
    }

    // Same as decode but with the data parity already computed by a
    // previous encode pass
    pub fn decode_with_calc_ecc(
        &mut self,
        data_len: usize,
        calc_ecc: &[u8],
        recv_ecc: &[u8],
    ) -> BchResult<Vec<u32>> {
        self.check_payload(data_len)?;
        self.check_ecc(calc_ecc)?;
        self.check_ecc(recv_ecc)?;
        let nbytes = self.ecc_bytes();
        load_ecc_words(&mut self.ecc_buf, calc_ecc, nbytes);
        if self.xor_with_recv(recv_ecc) {
            return Ok(Vec::new());
        }
        self.compute_syndromes();
        self.locate(data_len)
    }

    // Decode from the XOR of computed and received parity
    pub fn decode_with_xored_ecc(&mut self, data_len: usize, xor_ecc: &[u8]) -> BchResult<Vec<u32>> {
        self.check_payload(data_len)?;
        self.check_ecc(xor_ecc)?;
        let nbytes = self.ecc_bytes();
        load_ecc_words(&mut self.ecc_buf, xor_ecc, nbytes);
        self.compute_syndromes();
        self.locate(data_len)
    }

    // Decode from caller-provided syndromes, skipping the syndrome stage
    pub fn decode_with_syndromes(&mut self, data_len: usize, syn: &[u32]) -> BchResult<Vec<u32>> {
        self.check_payload(data_len)?;
        if syn.len() != 2 * self.t() as usize {
            return Err(BchError::SyndromesSizeMismatch);
        }
        self.syn.copy_from_slice(syn);
        self.locate(data_len)
    }

    // XOR received parity into the computed parity register; true when the
    // two agree (no detectable error)
    fn xor_with_recv(&mut self, recv_ecc: &[u8]) -> bool {
        let nbytes = self.ecc_bytes();
        load_ecc_words(&mut self.ecc_buf2, recv_ecc, nbytes);
        let mut sum = 0;
        for (a, b) in self.ecc_buf.iter_mut().zip(self.ecc_buf2.iter()) {
            *a ^= *b;
            sum |= *a;
        }
        sum == 0
    }

    // Common decode tail: locator synthesis, root finding, and mapping of
    // root exponents to codeword bit positions
    fn locate(&mut self, data_len: usize) -> BchResult<Vec<u32>> {
        let elp = self.compute_error_locator().ok_or(BchError::Uncorrectable)?;
        let nerr = elp.deg();
        if nerr == 0 {
            return Ok(Vec::new());
        }

        let mut locs = Vec::with_capacity(nerr);
        self.find_poly_roots(1, elp, &mut locs);
        // A root count off deg means an algebraically inconsistent locator;
        // an out-of-range root means corruption beyond the shortened code.
        // Both are uncorrectable and checked independently.
        if locs.len() != nerr {
            return Err(BchError::Uncorrectable);
        }

        let nbits = 8 * data_len + self.ecc_bits();
        for loc in locs.iter_mut() {
            if *loc as usize >= nbits {
                return Err(BchError::Uncorrectable);
            }
            let p = (nbits - 1 - *loc as usize) as u32;
            *loc = (p & !7) | (7 - (p & 7));
        }
        Ok(locs)
    }
}

#[cfg(test)]
mod decoder_tests {
    use test_case::test_case;

    use crate::{Bch, BchError};

    #[test_case(5, 2)]
    #[test_case(8, 4)]
    #[test_case(13, 8)]
    fn test_clean_codeword(m: u32, t: u32) {
        let mut bch = Bch::new(m, t).unwrap();
        let len = bch.data_bytes().min(48);
        let data: Vec<u8> = (0..len as u32).map(|i| (i * 89 + 41) as u8).collect();
        let mut ecc = vec![0u8; bch.ecc_bytes()];
        bch.encode(&data, &mut ecc).unwrap();
        assert_eq!(bch.decode(&data, &ecc).unwrap(), vec![]);
    }

    #[test]
    fn test_two_errors_named_positions() {
        let mut bch = Bch::new(5, 2).unwrap();
        let data = [0xA5u8, 0x3C];
        let mut ecc = vec![0u8; bch.ecc_bytes()];
        bch.encode(&data, &mut ecc).unwrap();

        let mut bad_data = data;
        let mut bad_ecc = ecc.clone();
        // bit 3 of data[0], and parity bit 9 counted MSB-first through the
        // parity stream (byte 1, bit 6 once decode's reordering is applied)
        bad_data[0] ^= 1 << 3;
        bad_ecc[1] ^= 0x80 >> 1;

        let mut locs = bch.decode(&bad_data, &bad_ecc).unwrap();
        locs.sort_unstable();
        assert_eq!(locs, vec![3, 8 * data.len() as u32 + 14]);
    }

    #[test]
    fn test_decode_modes_agree() {
        let mut bch = Bch::new(8, 4).unwrap();
        let data: Vec<u8> = (0..20u8).map(|i| i.wrapping_mul(37) ^ 0x5A).collect();
        let mut calc = vec![0u8; bch.ecc_bytes()];
        bch.encode(&data, &mut calc).unwrap();

        let mut recv = calc.clone();
        recv[0] ^= 0x41;
        recv[2] ^= 0x10;

        let mut a = bch.decode(&data, &recv).unwrap();
        let mut b = bch.decode_with_calc_ecc(data.len(), &calc, &recv).unwrap();
        let xored: Vec<u8> = calc.iter().zip(&recv).map(|(x, y)| x ^ y).collect();
        let mut c = bch.decode_with_xored_ecc(data.len(), &xored).unwrap();

        // syndromes of the xored parity, straight from the scratch state
        let nbytes = bch.ecc_bytes();
        crate::encoder::load_ecc_words(&mut bch.ecc_buf, &xored, nbytes);
        bch.compute_syndromes();
        let syn = bch.syn.clone();
        let mut d = bch.decode_with_syndromes(data.len(), &syn).unwrap();

        a.sort_unstable();
        b.sort_unstable();
        c.sort_unstable();
        d.sort_unstable();
        assert_eq!(a.len(), 3);
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a, d);
    }

    #[test]
    fn test_errors_in_parity_only() {
        let mut bch = Bch::new(8, 4).unwrap();
        let data = [0x11u8; 16];
        let mut ecc = vec![0u8; bch.ecc_bytes()];
        bch.encode(&data, &mut ecc).unwrap();

        let mut bad = data;
        let mut bad_ecc = ecc.clone();
        bch.correct(&mut bad, &mut bad_ecc, &[1, 40, 130]).unwrap();

        let mut locs = bch.decode(&bad, &bad_ecc).unwrap();
        locs.sort_unstable();
        assert_eq!(locs, vec![1, 40, 130]);

        bch.correct(&mut bad, &mut bad_ecc, &locs).unwrap();
        assert_eq!(bad, data);
        assert_eq!(bad_ecc, ecc);
    }

    #[test]
    fn test_syndrome_size_mismatch() {
        let mut bch = Bch::new(5, 2).unwrap();
        assert_eq!(
            bch.decode_with_syndromes(1, &[0; 3]).unwrap_err(),
            BchError::SyndromesSizeMismatch
        );
    }

    #[test]
    fn test_too_many_errors() {
        let mut bch = Bch::new(5, 2).unwrap();
        let data = [0u8; 2];
        let mut ecc = vec![0u8; bch.ecc_bytes()];
        bch.encode(&data, &mut ecc).unwrap();

        let mut bad = data;
        let mut bad_ecc = ecc.clone();
        // three errors against t = 2
        bch.correct(&mut bad, &mut bad_ecc, &[0, 7, 14]).unwrap();

        match bch.decode(&bad, &bad_ecc) {
            Err(BchError::Uncorrectable) => {}
            Ok(locs) => {
                // a miscorrection must still land on a valid codeword
                let mut fixed = bad;
                let mut fixed_ecc = bad_ecc.clone();
                bch.correct(&mut fixed, &mut fixed_ecc, &locs).unwrap();
                assert_eq!(bch.decode(&fixed, &fixed_ecc).unwrap(), vec![]);
            }
            Err(e) => panic!("Unexpected decode error: {e}"),
        }
    }
}

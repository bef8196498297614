use crate::{codec::Bch, error::BchResult, gf::GaloisField, poly::Poly};

// Generator polynomial
//------------------------------------------------------------------------------

// g(X) has roots alpha^(2i+1) for i in 0..t plus all their cyclotomic
// conjugates, making every coefficient land in GF(2). Returns the
// coefficient bits serialized left-justified big-endian (the X^deg(g) bit
// is the MSB of the first word) together with ecc_bits = deg(g).
pub(crate) fn compute_generator(gf: &GaloisField, t: u32) -> (Vec<u32>, usize) {
    let m = gf.m();
    let n = gf.n() as usize;

    let mut roots = vec![false; n + 1];
    for i in 0..t as usize {
        let mut r = 2 * i + 1;
        for _ in 0..m {
            roots[r] = true;
            r = (2 * r) % n;
        }
    }

    let mut g = Poly::from_coefs(&[1]);
    for i in 0..n {
        if roots[i] {
            g.mul_assign_linear(gf.alpha(i as u32), gf);
        }
    }
    debug_assert!(
        (0..=g.deg()).all(|j| g.coef(j) <= 1),
        "Conjugate closure must give binary coefficients"
    );

    let ecc_bits = g.deg();
    let mut genpoly = vec![0u32; (ecc_bits + 1 + 31) / 32];
    let mut rem = ecc_bits + 1;
    let mut w = 0;
    while rem > 0 {
        let nbits = rem.min(32);
        let mut word = 0u32;
        for j in 0..nbits {
            if g.coef(rem - 1 - j) != 0 {
                word |= 1 << (31 - j);
            }
        }
        genpoly[w] = word;
        w += 1;
        rem -= nbits;
    }
    (genpoly, ecc_bits)
}

// Encoding tables
//------------------------------------------------------------------------------

// Entry (lane b, byte i) holds (i * X^(8b + deg g)) mod g(X) as ecc_words
// left-justified limbs, built by subtracting d-shifted copies of g for each
// set bit d of the dividend
pub(crate) fn build_mod8_tables(genpoly: &[u32], ecc_bits: usize) -> Vec<u32> {
    let words = (ecc_bits + 31) / 32;
    let plen = (ecc_bits + 1 + 31) / 32;
    let mut tab = vec![0u32; 4 * 256 * words];

    for b in 0..4 {
        for i in 0..256usize {
            let row = &mut tab[(b * 256 + i) * words..][..words];
            let mut data = (i as u32) << (8 * b);
            while data != 0 {
                let d = 31 - data.leading_zeros();
                data ^= genpoly[0] >> (31 - d);
                for (j, limb) in row.iter_mut().enumerate() {
                    let hi = if d < 31 { genpoly[j] << (d + 1) } else { 0 };
                    let lo = if j + 1 < plen { genpoly[j + 1] >> (31 - d) } else { 0 };
                    *limb ^= hi | lo;
                }
            }
        }
    }
    tab
}

// ECC byte <-> word marshalling (big-endian, left-justified)
//------------------------------------------------------------------------------

pub(crate) fn load_ecc_words(dst: &mut [u32], src: &[u8], ecc_bytes: usize) {
    let nwords = dst.len() - 1;
    for (i, chunk) in src[..4 * nwords].chunks_exact(4).enumerate() {
        dst[i] = u32::from_be_bytes(chunk.try_into().unwrap());
    }
    let mut pad = [0u8; 4];
    pad[..ecc_bytes - 4 * nwords].copy_from_slice(&src[4 * nwords..ecc_bytes]);
    dst[nwords] = u32::from_be_bytes(pad);
}

pub(crate) fn store_ecc_bytes(dst: &mut [u8], src: &[u32], ecc_bytes: usize) {
    let nwords = src.len() - 1;
    for i in 0..nwords {
        dst[4 * i..4 * i + 4].copy_from_slice(&src[i].to_be_bytes());
    }
    let pad = src[nwords].to_be_bytes();
    dst[4 * nwords..ecc_bytes].copy_from_slice(&pad[..ecc_bytes - 4 * nwords]);
}

// One-byte LFSR step: shift the parity register by 8 and fold one lane-0 row
fn encode_bytes(tab0: &[u32], words: usize, data: &[u8], ecc: &mut [u32]) {
    let l = words - 1;
    for &byte in data {
        let i = (((ecc[0] >> 24) ^ byte as u32) & 0xff) as usize;
        let row = &tab0[i * words..(i + 1) * words];
        for j in 0..l {
            ecc[j] = ((ecc[j] << 8) | (ecc[j + 1] >> 24)) ^ row[j];
        }
        ecc[l] = (ecc[l] << 8) ^ row[l];
    }
}

// Encoder
//------------------------------------------------------------------------------

impl Bch {
    // Compute ecc_bytes parity bytes over data. The ecc buffer is in/out:
    // passing back the parity of a previous call continues an incremental
    // encode, so the caller zeroes it before the first chunk.
    pub fn encode(&mut self, data: &[u8], ecc: &mut [u8]) -> BchResult<()> {
        self.check_payload(data.len())?;
        self.check_ecc(ecc)?;
        let nbytes = self.ecc_bytes();
        load_ecc_words(&mut self.ecc_buf, ecc, nbytes);
        self.encode_buf(data);
        store_ecc_bytes(ecc, &self.ecc_buf, nbytes);
        Ok(())
    }

    // Run the LFSR over data into self.ecc_buf (not reset here: decode mode
    // (a) and incremental encode both seed the register first)
    pub(crate) fn encode_buf(&mut self, data: &[u8]) {
        let words = self.ecc_words();
        let l = words - 1;
        let lane = 256 * words;
        let (tab0, hi_lanes) = self.mod8_tab.split_at(lane);
        let (tab1, hi_lanes) = hi_lanes.split_at(lane);
        let (tab2, tab3) = hi_lanes.split_at(lane);
        let r = &mut self.ecc_buf;

        // Aligned path: each big-endian word folds one row per byte lane
        // while the register shifts by 32
        let mut chunks = data.chunks_exact(4);
        for chunk in &mut chunks {
            let w = u32::from_be_bytes(chunk.try_into().unwrap()) ^ r[0];
            let p0 = &tab0[(w & 0xff) as usize * words..][..words];
            let p1 = &tab1[((w >> 8) & 0xff) as usize * words..][..words];
            let p2 = &tab2[((w >> 16) & 0xff) as usize * words..][..words];
            let p3 = &tab3[((w >> 24) & 0xff) as usize * words..][..words];
            for i in 0..l {
                r[i] = r[i + 1] ^ p0[i] ^ p1[i] ^ p2[i] ^ p3[i];
            }
            r[l] = p0[l] ^ p1[l] ^ p2[l] ^ p3[l];
        }

        encode_bytes(tab0, words, chunks.remainder(), r);
    }
}

#[cfg(test)]
mod encoder_tests {
    use test_case::test_case;

    use crate::Bch;

    #[test_case(5, 2)]
    #[test_case(8, 4)]
    #[test_case(13, 8)]
    fn test_zero_data(m: u32, t: u32) {
        let mut bch = Bch::new(m, t).unwrap();
        let data = vec![0u8; bch.data_bytes().min(64)];
        let mut ecc = vec![0u8; bch.ecc_bytes()];
        bch.encode(&data, &mut ecc).unwrap();
        assert!(ecc.iter().all(|&b| b == 0), "Zero message must have zero parity");
    }

    #[test_case(8, 2)]
    #[test_case(8, 4)]
    #[test_case(13, 8)]
    fn test_incremental_matches_one_shot(m: u32, t: u32) {
        let mut bch = Bch::new(m, t).unwrap();
        let len = bch.data_bytes().min(200);
        let data: Vec<u8> = (0..len as u32).map(|i| (i * 13 + 7) as u8).collect();

        let mut one_shot = vec![0u8; bch.ecc_bytes()];
        bch.encode(&data, &mut one_shot).unwrap();

        let mut chunked = vec![0u8; bch.ecc_bytes()];
        for chunk in data.chunks(39) {
            bch.encode(chunk, &mut chunked).unwrap();
        }
        assert_eq!(one_shot, chunked);
    }

    #[test_case(8, 4)]
    #[test_case(13, 4)]
    fn test_parity_is_linear(m: u32, t: u32) {
        let mut bch = Bch::new(m, t).unwrap();
        let len = bch.data_bytes().min(64);
        let a: Vec<u8> = (0..len as u32).map(|i| (i * 31 + 5) as u8).collect();
        let b: Vec<u8> = (0..len as u32).map(|i| (i * 17 + 99) as u8).collect();
        let ab: Vec<u8> = a.iter().zip(&b).map(|(x, y)| x ^ y).collect();

        let mut ecc_a = vec![0u8; bch.ecc_bytes()];
        let mut ecc_b = vec![0u8; bch.ecc_bytes()];
        let mut ecc_ab = vec![0u8; bch.ecc_bytes()];
        bch.encode(&a, &mut ecc_a).unwrap();
        bch.encode(&b, &mut ecc_b).unwrap();
        bch.encode(&ab, &mut ecc_ab).unwrap();

        let folded: Vec<u8> = ecc_a.iter().zip(&ecc_b).map(|(x, y)| x ^ y).collect();
        assert_eq!(ecc_ab, folded);
    }

    #[test]
    fn test_rejects_oversized_data() {
        let mut bch = Bch::new(5, 2).unwrap();
        // (31 - 10) / 8 = 2 bytes of capacity
        let data = [0u8; 3];
        let mut ecc = vec![0u8; bch.ecc_bytes()];
        assert!(bch.encode(&data, &mut ecc).is_err());
    }
}

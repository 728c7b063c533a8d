use pqcrypto_accel::{
    kyber::{
        self,
        reduce::{mont_mul, to_mont, R_MOD_Q},
    },
    newhope::{self, ntt},
};

fn kyber_zetas() -> Vec<i16> {
    let zeta1 = to_mont(17);
    let q = kyber::Q;

    let zetas = (0..128).fold(vec![R_MOD_Q as i16], |mut acc, _| {
        let prev = acc.last().unwrap();
        acc.push(mont_mul(*prev, zeta1));
        acc
    });

    (0..128u8)
        .map(|i| match zetas[(i.reverse_bits() >> 1) as usize] {
            z if z > q / 2 => z - q,
            z if z < -q / 2 => z + q,
            z => z,
        })
        .collect()
}

fn newhope_powers(root: u32) -> Vec<u16> {
    let q = newhope::Q as u32;

    (0..2048)
        .scan(1u32, |w, _| {
            let mont = *w * newhope::reduce::R_MOD_Q % q;
            *w = *w * root % q;
            Some(mont as u16)
        })
        .collect()
}

fn main() {
    let q = newhope::Q as u32;
    let pow = |b: u32, e: u32| (0..e).fold(1u32, |acc, _| acc * b % q);

    let root = ntt::ROOT as u32;
    assert_eq!(pow(root, 1024), q - 1);

    for n in [512, 1024] {
        let psi = ntt::psi(n) as u32;
        assert_eq!(pow(psi, n as u32), q - 1);
        assert_eq!(pow(root, ntt::psi_exponent(n) as u32), psi);
    }

    let zetas = kyber_zetas();
    let expected: Vec<i16> = kyber::ZETAS.iter().map(|z| z.value()).collect();
    assert_eq!(zetas, expected);

    let powers = newhope_powers(root);
    let expected: Vec<u16> = ntt::POWERS.iter().map(|z| z.value()).collect();
    assert_eq!(powers, expected);

    println!("const KYBER_ZETAS: [i16; 128] = {:?};", zetas);
    println!("const NEWHOPE_ROOT: u16 = {};", root);
    println!(
        "const NEWHOPE_PSI_EXPONENT_512: usize = {};",
        ntt::psi_exponent(512)
    );
    println!("const NEWHOPE_POWERS: [u16; 2048] = {:?};", powers);
}

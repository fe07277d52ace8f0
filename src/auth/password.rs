use argon2::{
    Argon2,
    password_hash::{
        Error, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
        rand_core::RngCore,
    },
};

/// Printable ASCII used for generated passwords, `!` through `Z`.
const GENERATED_CHARSET: std::ops::RangeInclusive<u8> = 33..=90;
const GENERATED_LENGTH: usize = 12;

pub fn hash_password(password: &str) -> Result<String, Error> {
    let argon2 = Argon2::default();
    let salt = SaltString::generate(&mut OsRng);

    Ok(argon2.hash_password(password.as_bytes(), &salt)?.to_string())
}

pub fn verify_password(password: &str, hashed: &str) -> Result<(), Error> {
    let argon2 = Argon2::default();
    let parsed = PasswordHash::new(hashed)?;

    argon2.verify_password(password.as_bytes(), &parsed)
}

/// Password handed to accounts created without one.
pub fn random_password() -> String {
    let span = (GENERATED_CHARSET.end() - GENERATED_CHARSET.start() + 1) as u32;
    (0..GENERATED_LENGTH)
        .map(|_| (GENERATED_CHARSET.start() + (OsRng.next_u32() % span) as u8) as char)
        .collect()
}

use rand::Rng;

// Uppercase, skipping characters easy to misread over voice/chat (0, O, 1, I, L)
const CHARSET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;

pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
        .collect()
}

pub fn generate_unique_room_code<F>(exists: F) -> String
where
    F: Fn(&str) -> bool,
{
    loop {
        let code = generate_room_code();
        if !exists(&code) {
            return code;
        }
    }
}

/// Hides all but the last four characters of a secret for log output.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }

    let visible: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", visible)
}

use chrono::{SecondsFormat, Utc};

/// 当前UTC时间的RFC3339字符串，字典序即时间序
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_iso_sorts_lexicographically() {
        let a = now_iso();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = now_iso();
        assert!(a < b);
        assert!(a.ends_with('Z'));
    }
}

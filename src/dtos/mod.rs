use std::sync::LazyLock;
use regex::Regex;

pub mod appointment;
pub mod booking;
pub mod response;

/// 邮箱格式：local@domain.tld，任一部分不含空白和 '@'
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid Regex")
});

/// 印尼手机号：+62 / 62 / 0 开头，后接 9-13 位数字（校验前先去掉空格和连字符）
pub static PHONE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\+62|62|0)[0-9]{9,13}$").expect("Invalid Regex")
});

/// 手机号中允许出现、校验前需去除的分隔符
pub static PHONE_SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s-]").expect("Invalid Regex")
});

/// Redis KEYS 风格的通配符匹配
///
/// 支持 `*`、`?`、`[abc]`、`[^a]`、`[a-z]` 以及 `\` 转义。
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let key: Vec<char> = key.chars().collect();
    match_from(&pattern, &key)
}

fn match_from(pattern: &[char], key: &[char]) -> bool {
    let mut p = 0;
    let mut k = 0;

    while p < pattern.len() {
        match pattern[p] {
            '*' => {
                // 连续的 * 等价于一个
                while p + 1 < pattern.len() && pattern[p + 1] == '*' {
                    p += 1;
                }
                if p + 1 == pattern.len() {
                    return true;
                }
                return (k..=key.len()).any(|start| match_from(&pattern[p + 1..], &key[start..]));
            }
            '?' => {
                if k >= key.len() {
                    return false;
                }
                k += 1;
                p += 1;
            }
            '[' => {
                if k >= key.len() {
                    return false;
                }
                let (matched, next) = match_class(pattern, p + 1, key[k]);
                if !matched {
                    return false;
                }
                k += 1;
                p = next;
            }
            '\\' if p + 1 < pattern.len() => {
                if k >= key.len() || key[k] != pattern[p + 1] {
                    return false;
                }
                k += 1;
                p += 2;
            }
            c => {
                if k >= key.len() || key[k] != c {
                    return false;
                }
                k += 1;
                p += 1;
            }
        }
    }

    k == key.len()
}

/// 匹配 `[...]` 字符类，返回是否命中以及字符类之后的位置
fn match_class(pattern: &[char], mut p: usize, c: char) -> (bool, usize) {
    let negate = p < pattern.len() && pattern[p] == '^';
    if negate {
        p += 1;
    }

    let mut matched = false;
    while p < pattern.len() && pattern[p] != ']' {
        if pattern[p] == '\\' && p + 1 < pattern.len() {
            matched |= pattern[p + 1] == c;
            p += 2;
        } else if p + 2 < pattern.len() && pattern[p + 1] == '-' && pattern[p + 2] != ']' {
            let (low, high) = if pattern[p] <= pattern[p + 2] {
                (pattern[p], pattern[p + 2])
            } else {
                (pattern[p + 2], pattern[p])
            };
            matched |= low <= c && c <= high;
            p += 3;
        } else {
            matched |= pattern[p] == c;
            p += 1;
        }
    }

    // 跳过结尾的 ]，未闭合时视为到达模式末尾
    let next = if p < pattern.len() { p + 1 } else { p };
    (matched != negate, next)
}

#[cfg(test)]
mod tests {
    use super::glob_match;

    #[test]
    fn test_star_and_question() {
        assert!(glob_match("*", "anything"));
        assert!(glob_match("*", ""));
        assert!(glob_match("presence:/acct/*", "presence:/acct/room1"));
        assert!(!glob_match("presence:/acct/*", "status:/acct/room1"));
        assert!(glob_match("h?llo", "hello"));
        assert!(!glob_match("h?llo", "hllo"));
        assert!(glob_match("a*b*c", "a-x-b-y-c"));
        assert!(!glob_match("a*b*c", "a-x-b-y"));
    }

    #[test]
    fn test_character_classes() {
        assert!(glob_match("h[ae]llo", "hallo"));
        assert!(!glob_match("h[ae]llo", "hillo"));
        assert!(glob_match("h[^e]llo", "hallo"));
        assert!(!glob_match("h[^e]llo", "hello"));
        assert!(glob_match("key[0-9]", "key7"));
        assert!(!glob_match("key[0-9]", "keyx"));
    }

    #[test]
    fn test_escape() {
        assert!(glob_match("a\\*b", "a*b"));
        assert!(!glob_match("a\\*b", "axb"));
    }
}

//! CSVのデコードとパース
//!
//! スプレッドシートから書き出したCSVを対象にする。
//! クォート内のカンマと `""` エスケープを扱い、改行は常にレコード区切り。

use crate::utils::log_trace::log_debug;

/// U+FFFD がこの数を超えたら Shift-JIS として読み直す
pub const REPLACEMENT_THRESHOLD: usize = 10;
/// site-common-texts.csv 用（行数が少ないので閾値を下げる）
pub const COMMON_TEXT_REPLACEMENT_THRESHOLD: usize = 5;

/// UTF-8で読み、文字化けが多ければ Shift-JIS で読み直す。先頭BOMは除去
pub fn decode_text(bytes: &[u8], threshold: usize) -> String {
    let utf8 = String::from_utf8_lossy(bytes);
    let replaced = utf8.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count();

    let text = if replaced > threshold {
        log_debug(
            "csv",
            &format!("UTF-8で{}文字が置換されたため Shift-JIS で再デコード", replaced),
        );
        let (decoded, _, _) = encoding_rs::SHIFT_JIS.decode(bytes);
        decoded.into_owned()
    } else {
        utf8.into_owned()
    };

    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// 1行をフィールドに分割
pub fn parse_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// 空行を除いた全レコード
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
        .collect()
}

/// 先頭行をヘッダーとして扱うテーブル
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    /// ヘッダーと値はtrimし、全セル空の行は捨てる
    pub fn from_text(text: &str) -> Self {
        let mut records = parse_records(text).into_iter();
        let headers = match records.next() {
            Some(header) => header.iter().map(|h| h.trim().to_string()).collect(),
            None => return Self::default(),
        };
        let rows = records
            .map(|row| row.iter().map(|v| v.trim().to_string()).collect::<Vec<_>>())
            .filter(|row| row.iter().any(|v| !v.is_empty()))
            .collect();
        Self { headers, rows }
    }

    pub fn records(&self) -> impl Iterator<Item = CsvRecord<'_>> {
        self.rows.iter().map(move |values| CsvRecord {
            headers: &self.headers,
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CsvRecord<'a> {
    headers: &'a [String],
    values: &'a [String],
}

impl<'a> CsvRecord<'a> {
    /// 列名で取得。列が無い・値が足りない場合は空文字
    pub fn get(&self, column: &str) -> &'a str {
        self.headers
            .iter()
            .position(|h| h == column)
            .map(|idx| self.at(idx))
            .unwrap_or("")
    }

    pub fn at(&self, idx: usize) -> &'a str {
        self.values.get(idx).map(String::as_str).unwrap_or("")
    }

    /// (列名, 値) をヘッダー順に
    pub fn columns(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let values = self.values;
        self.headers
            .iter()
            .enumerate()
            .map(move |(idx, h)| (h.as_str(), values.get(idx).map(String::as_str).unwrap_or("")))
    }
}

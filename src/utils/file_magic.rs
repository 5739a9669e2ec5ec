/// 导入文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Xlsx,
    Xls,
}

impl ImportFormat {
    /// 从文件名推断格式
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
        match ext.as_str() {
            "csv" => Some(ImportFormat::Csv),
            "xlsx" => Some(ImportFormat::Xlsx),
            "xls" => Some(ImportFormat::Xls),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImportFormat::Csv => ".csv",
            ImportFormat::Xlsx => ".xlsx",
            ImportFormat::Xls => ".xls",
        }
    }
}

/// 验证文件内容的魔术字节是否与格式匹配
pub fn validate_magic_bytes(data: &[u8], format: ImportFormat) -> bool {
    if data.is_empty() {
        return false;
    }

    match format {
        // ZIP 容器 (OOXML)
        ImportFormat::Xlsx => data.starts_with(&[0x50, 0x4B, 0x03, 0x04]),
        // OLE 复合文档
        ImportFormat::Xls => data.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]),
        // 文本：不能含 NUL，且开头必须是合法 UTF-8
        ImportFormat::Csv => {
            let head = &data[..data.len().min(512)];
            !head.contains(&0) && utf8_prefix_valid(head)
        }
    }
}

// 截断可能落在多字节字符中间，只要求错误出现在末尾
fn utf8_prefix_valid(bytes: &[u8]) -> bool {
    match std::str::from_utf8(bytes) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_filename() {
        assert_eq!(ImportFormat::from_filename("users.CSV"), Some(ImportFormat::Csv));
        assert_eq!(ImportFormat::from_filename("a.b.xlsx"), Some(ImportFormat::Xlsx));
        assert_eq!(ImportFormat::from_filename("users.pdf"), None);
        assert_eq!(ImportFormat::from_filename("users"), None);
    }

    #[test]
    fn test_xlsx_magic() {
        let zip_header = [0x50, 0x4B, 0x03, 0x04, 0x14, 0x00];
        assert!(validate_magic_bytes(&zip_header, ImportFormat::Xlsx));
        assert!(!validate_magic_bytes(&zip_header, ImportFormat::Xls));
    }

    #[test]
    fn test_csv_content() {
        assert!(validate_magic_bytes(b"username,email\n", ImportFormat::Csv));
        assert!(!validate_magic_bytes(&[0x50, 0x4B, 0x03, 0x00], ImportFormat::Csv));
        assert!(!validate_magic_bytes(&[], ImportFormat::Csv));
    }
}

//! User-facing strings for the two supported locales.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Id,
}

impl Locale {
    pub const ALL: [Locale; 2] = [Locale::En, Locale::Id];

    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Id => "id",
        }
    }

    pub fn parse(raw: &str) -> Option<Locale> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "id" => Some(Locale::Id),
            _ => None,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Locale::En => "English",
            Locale::Id => "Bahasa Indonesia",
        }
    }

    /// Groups digits the way the locale writes integers.
    pub fn format_count(self, value: u64) -> String {
        let separator = match self {
            Locale::En => ',',
            Locale::Id => '.',
        };
        let digits = value.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (idx, ch) in digits.chars().enumerate() {
            if idx > 0 && (digits.len() - idx) % 3 == 0 {
                out.push(separator);
            }
            out.push(ch);
        }
        out
    }

    pub fn text(self, key: Text) -> &'static str {
        match (self, key) {
            (Locale::En, Text::Search) => "Search",
            (Locale::Id, Text::Search) => "Cari",
            (Locale::En, Text::Reset) => "Reset",
            (Locale::Id, Text::Reset) => "Atur ulang",
            (Locale::En, Text::Trash) => "Trash",
            (Locale::Id, Text::Trash) => "Sampah",
            (Locale::En, Text::Export) => "Export",
            (Locale::Id, Text::Export) => "Ekspor",
            (Locale::En, Text::Create) => "Create",
            (Locale::Id, Text::Create) => "Buat",
            (Locale::En, Text::Delete) => "Delete",
            (Locale::Id, Text::Delete) => "Hapus",
            (Locale::En, Text::Restore) => "Restore",
            (Locale::Id, Text::Restore) => "Pulihkan",
            (Locale::En, Text::Cancel) => "Cancel",
            (Locale::Id, Text::Cancel) => "Batal",
            (Locale::En, Text::Save) => "Save",
            (Locale::Id, Text::Save) => "Simpan",
            (Locale::En, Text::Edit) => "Edit",
            (Locale::Id, Text::Edit) => "Ubah",
            (Locale::En, Text::View) => "View",
            (Locale::Id, Text::View) => "Lihat",
            (Locale::En, Text::RowsPerPage) => "Rows per page",
            (Locale::Id, Text::RowsPerPage) => "Baris per halaman",
            (Locale::En, Text::All) => "All",
            (Locale::Id, Text::All) => "Semua",
            (Locale::En, Text::NoRecords) => "No records to display",
            (Locale::Id, Text::NoRecords) => "Tidak ada data",
            (Locale::En, Text::Loading) => "Loading...",
            (Locale::Id, Text::Loading) => "Memuat...",
            (Locale::En, Text::NotFound) => "The data you are looking for does not exist.",
            (Locale::Id, Text::NotFound) => "Data yang Anda cari tidak ditemukan.",
            (Locale::En, Text::Settings) => "Settings",
            (Locale::Id, Text::Settings) => "Pengaturan",
            (Locale::En, Text::ApiBaseUrl) => "API base URL",
            (Locale::Id, Text::ApiBaseUrl) => "URL dasar API",
            (Locale::En, Text::Language) => "Language",
            (Locale::Id, Text::Language) => "Bahasa",
            (Locale::En, Text::ConfirmTitle) => "Are you sure?",
            (Locale::Id, Text::ConfirmTitle) => "Apakah Anda yakin?",
            (Locale::En, Text::ListView) => "List view",
            (Locale::Id, Text::ListView) => "Tampilan daftar",
            (Locale::En, Text::GridView) => "Grid view",
            (Locale::Id, Text::GridView) => "Tampilan kisi",
            (Locale::En, Text::SelectAll) => "Select all",
            (Locale::Id, Text::SelectAll) => "Pilih semua",
        }
    }

    pub fn showing_rows(self, from: u64, to: u64, total: u64) -> String {
        let (from, to, total) = (
            self.format_count(from),
            self.format_count(to),
            self.format_count(total),
        );
        match self {
            Locale::En => format!("Showing {from} to {to} of {total}"),
            Locale::Id => format!("Menampilkan {from} sampai {to} dari {total}"),
        }
    }

    pub fn page_of(self, page: u64, total_pages: u64) -> String {
        match self {
            Locale::En => format!("Page {page} of {total_pages}"),
            Locale::Id => format!("Halaman {page} dari {total_pages}"),
        }
    }

    pub fn bulk_confirm(self, restore: bool, count: usize) -> String {
        let count = self.format_count(count as u64);
        match (self, restore) {
            (Locale::En, false) => format!("Delete {count} selected record(s)?"),
            (Locale::En, true) => format!("Restore {count} selected record(s)?"),
            (Locale::Id, false) => format!("Hapus {count} data terpilih?"),
            (Locale::Id, true) => format!("Pulihkan {count} data terpilih?"),
        }
    }

    pub fn bulk_succeeded(self, restore: bool, count: usize) -> String {
        let count = self.format_count(count as u64);
        match (self, restore) {
            (Locale::En, false) => format!("Successfully deleted {count} data"),
            (Locale::En, true) => format!("Successfully restored {count} data"),
            (Locale::Id, false) => format!("Berhasil menghapus {count} data"),
            (Locale::Id, true) => format!("Berhasil memulihkan {count} data"),
        }
    }

    pub fn bulk_failed(self, restore: bool, count: usize) -> String {
        let count = self.format_count(count as u64);
        match (self, restore) {
            (Locale::En, false) => format!("Failed to delete {count} data"),
            (Locale::En, true) => format!("Failed to restore {count} data"),
            (Locale::Id, false) => format!("Gagal menghapus {count} data"),
            (Locale::Id, true) => format!("Gagal memulihkan {count} data"),
        }
    }

    pub fn created(self, entity: &str) -> String {
        match self {
            Locale::En => format!("{entity} created successfully"),
            Locale::Id => format!("{entity} berhasil dibuat"),
        }
    }

    pub fn updated(self, entity: &str) -> String {
        match self {
            Locale::En => format!("{entity} updated successfully"),
            Locale::Id => format!("{entity} berhasil diperbarui"),
        }
    }

    pub fn form_title(self, entity: &str, mode: crate::form::FormMode) -> String {
        use crate::form::FormMode;
        match (self, mode) {
            (Locale::En, FormMode::Create) => format!("Create {entity}"),
            (Locale::En, FormMode::View) => format!("{entity} Detail"),
            (Locale::En, FormMode::Edit) => format!("Edit {entity}"),
            (Locale::Id, FormMode::Create) => format!("Buat {entity}"),
            (Locale::Id, FormMode::View) => format!("Detail {entity}"),
            (Locale::Id, FormMode::Edit) => format!("Ubah {entity}"),
        }
    }
}

/// Static labels used by the table and form chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Search,
    Reset,
    Trash,
    Export,
    Create,
    Delete,
    Restore,
    Cancel,
    Save,
    Edit,
    View,
    RowsPerPage,
    All,
    NoRecords,
    Loading,
    NotFound,
    Settings,
    ApiBaseUrl,
    Language,
    ConfirmTitle,
    ListView,
    GridView,
    SelectAll,
}

//! Bilingual string catalog for the panel front-end.
//!
//! The catalog is passed explicitly to whoever needs it; there is no global
//! lookup. Unknown keys fall back to the key itself so a missing entry shows
//! up on screen instead of panicking.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    En,
    Zh,
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Lang::En => "en",
            Lang::Zh => "zh",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown language '{0}', expected en or zh")]
pub struct ParseLangError(String);

impl FromStr for Lang {
    type Err = ParseLangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Lang::En),
            "zh" => Ok(Lang::Zh),
            other => Err(ParseLangError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Catalog {
    lang: Lang,
}

impl Catalog {
    pub fn new(lang: Lang) -> Self {
        Self { lang }
    }

    pub fn lang(&self) -> Lang {
        self.lang
    }

    pub fn t(&self, key: &str) -> String {
        for (entry_key, en, zh) in TABLE {
            if *entry_key == key {
                return match self.lang {
                    Lang::En => (*en).to_string(),
                    Lang::Zh => (*zh).to_string(),
                };
            }
        }
        key.to_string()
    }

    /// Lookup with `{name}` placeholder substitution.
    pub fn t_with(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut text = self.t(key);
        for (name, value) in params {
            text = text.replace(&format!("{{{name}}}"), value);
        }
        text
    }
}

const TABLE: &[(&str, &str, &str)] = &[
    ("nav.status.running", "Running", "运行中"),
    ("nav.status.stopped", "Stopped", "已停止"),
    ("nav.status.unknown", "Unknown", "未知"),
    ("allowlist.empty", "No allowlist users", "暂无白名单用户"),
    ("allowlist.error.empty-name", "Please enter player name", "请输入玩家名称"),
    ("allowlist.ignores-limit", "ignores player limit", "不受人数限制"),
    ("permission.empty", "No permission settings", "暂无权限设置"),
    ("permission.error.empty-name", "Please enter player name", "请输入玩家名称"),
    ("permission.level.visitor", "Visitor", "访客"),
    ("permission.level.member", "Member", "成员"),
    ("permission.level.operator", "Operator", "管理员"),
    ("world.empty", "No world files", "暂无世界文件"),
    ("world.current", "Current World", "当前世界"),
    (
        "world.delete-confirm",
        "Are you sure you want to delete world \"{worldName}\"? This action cannot be undone! [y/N] ",
        "确定要删除世界 \"{worldName}\" 吗？此操作不可撤销！[y/N] ",
    ),
    ("world.delete-aborted", "Deletion cancelled", "已取消删除"),
    ("pack.empty", "No resource packs", "暂无资源包"),
    ("pack.active", "Active", "已启用"),
    ("version.empty", "No server versions", "暂无服务器版本"),
    ("version.active", "Active", "当前版本"),
    ("version.downloaded", "Downloaded", "已下载"),
    (
        "version.assumed-complete",
        "Progress unavailable; assuming the download finished",
        "无法获取下载进度，默认下载已完成",
    ),
    ("logs.empty", "No logs", "暂无日志"),
    ("logs.stream.connected", "Log stream connected", "日志流已连接"),
    (
        "logs.stream.disconnected",
        "Log stream disconnected: {reason}",
        "日志流已断开：{reason}",
    ),
    ("history.empty", "No command history", "暂无命令历史"),
    ("commands.empty", "No quick commands", "暂无快捷命令"),
    ("categories.empty", "No command categories", "暂无命令分类"),
    (
        "console.hint",
        "Type a server command; 'exit' leaves the console",
        "输入服务器命令，输入 exit 退出控制台",
    ),
    ("login.prompt", "Password: ", "密码："),
    ("message.request-failed", "Request failed", "请求失败"),
    ("monitor.system", "System", "系统"),
    ("monitor.bedrock", "Bedrock process", "Bedrock 进程"),
    ("language.saved", "Language updated", "语言已更新"),
];

#[cfg(test)]
#[path = "tests/i18n_tests.rs"]
mod tests;

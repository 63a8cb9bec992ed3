#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// A generated package with created/updated/deleted timestamps.
pub const USER_GO: &str = r#"package models

import (
	"time"
)

// User 用户
type User struct {
	Id        int       `json:"id" xorm:"pk autoincr INT(10)"`
	Name      string    `json:"name" xorm:"VARCHAR(50)"` // 名称
	CreatedAt time.Time `json:"created_at" xorm:"created TIMESTAMP"`
	UpdatedAt time.Time `json:"updated_at" xorm:"updated TIMESTAMP"`
	DeletedAt time.Time `json:"deleted_at" xorm:"deleted TIMESTAMP"`
}

func (User) TableName() string {
	return "t_user"
}
"#;

/// `USER_GO` after the time columns were folded into `xq.TimeMixin`.
pub const USER_GO_PATCHED: &str = r#"package models

import xq "github.com/azhai/xgen/xquery"

// User 用户
type User struct {
	Id        int       `json:"id" xorm:"pk autoincr INT(10)"`
	Name      string    `json:"name" xorm:"VARCHAR(50)"` // 名称
	xq.TimeMixin `json:",inline" xorm:"extends"`
}

func (User) TableName() string {
	return "t_user"
}
"#;

/// A user mixin library package.
pub const AUDIT_GO: &str = r#"package mixins

// AuditCore 审计
type AuditCore struct {
	Operator string `json:"operator" xorm:"VARCHAR(50)"`
	Remark   string `json:"remark" xorm:"TEXT"`
}
"#;

pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

//! ClassHub Sync - 课堂数据同步与派生状态层
//!
//! 订阅远程推送式键值存储中的十个集合，将原始记录规范化为类型化实体，
//! 维护每个集合的内存镜像，并基于镜像计算选课、待办、周进度、成绩趋势等派生视图。
//!
//! # 架构
//! - `config`: 配置管理
//! - `errors`: 统一错误处理
//! - `models`: 实体与写入载荷定义
//! - `queries`: 派生查询（纯函数）
//! - `runtime`: 运行时生命周期管理
//! - `services`: 写入网关、认证协作方、首页汇总
//! - `store`: 远程存储抽象与插件（内存实现）
//! - `sync`: 集合镜像与订阅管理
//! - `utils`: 字段规范化等工具函数

pub mod config;
pub mod errors;
pub mod models;
pub mod queries;
pub mod runtime;
pub mod services;
pub mod store;
pub mod sync;
pub mod utils;

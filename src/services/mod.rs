// 本地服务

pub mod storage;

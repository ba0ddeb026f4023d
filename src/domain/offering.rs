// ==========================================
// 课程评教系统 - 开课与学生领域模型
// ==========================================
// 来源: 课程管理端维护，核心只读
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// CourseOffering - 开课记录
// ==========================================
// 一门课程由某位教师在某学期面向某班级开设
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOffering {
    pub offering_id: String,  // 开课ID (唯一)
    pub course_id: String,    // 课程ID
    pub course_name: String,  // 课程名称 (展示用)
    pub teacher_id: String,   // 教师ID
    pub teacher_name: String, // 教师姓名 (展示用)
    pub class_id: String,     // 班级ID
    pub semester: String,     // 学期标识
    pub schedule: String,     // 上课时间描述 (如 "周一 1-2节")
}

// ==========================================
// Student - 学生（仅用于班级归属判定）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub student_id: String,
    pub name: String,
    pub class_id: String,
}

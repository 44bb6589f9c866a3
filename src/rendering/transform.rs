//! # 变换矩阵
//!
//! 视口渲染用到的纯矩阵函数：视图矩阵、透视投影、4×4 乘法。
//! 全部采用行向量约定（点变换为 `p' = p * M`），与着色器中
//! `ProjMtx * (WorldMtx * pos)` 的列向量写法互为转置，直接以
//! `transpose = false` 上传即可。
//!
//! 世界坐标系为 Z 轴朝上；相机朝向由偏航角（绕 Z）和俯仰角决定，
//! 前向量的 z 分量取 `+sin(pitch)`。

pub type Mat4 = [[f32; 4]; 4];

const TO_RAD: f32 = std::f32::consts::PI / 180.0;

/// 由相机位置 + 俯仰/偏航（度）构建视图矩阵。
///
/// 俯仰角必须严格处于 (-90, 90)：正对天顶/天底时前向量的水平分量
/// 为零，右向量归一化会除以接近 0 的长度。上游相机模型将俯仰
/// 限制在 [-89, 89]，这里不再防御。
pub fn create_view_matrix(position: [f32; 3], angle_x: f32, angle_z: f32) -> Mat4 {
    let (sin_z, cos_z) = (angle_z * TO_RAD).sin_cos();
    let (sin_x, cos_x) = (angle_x * TO_RAD).sin_cos();

    // 背向量（视线反方向），单位长度
    let r2 = [-sin_z * cos_x, -cos_z * cos_x, -sin_x];

    // 右向量：背向量水平分量的 2D 垂线，归一化
    let mut r0 = [-r2[1], r2[0], 0.0f32];
    let len = (r0[0] * r0[0] + r0[1] * r0[1]).sqrt();
    r0[0] /= len;
    r0[1] /= len;

    // 上向量 = 背 × 右
    let r1 = [
        r2[1] * r0[2] - r2[2] * r0[1],
        r2[2] * r0[0] - r2[0] * r0[2],
        r2[0] * r0[1] - r2[1] * r0[0],
    ];

    let d0 = -(r0[0] * position[0] + r0[1] * position[1] + r0[2] * position[2]);
    let d1 = -(r1[0] * position[0] + r1[1] * position[1] + r1[2] * position[2]);
    let d2 = -(r2[0] * position[0] + r2[1] * position[1] + r2[2] * position[2]);

    [
        [r0[0], r1[0], r2[0], 0.0],
        [r0[1], r1[1], r2[1], 0.0],
        [r0[2], r1[2], r2[2], 0.0],
        [d0, d1, d2, 1.0],
    ]
}

/// 垂直视场角（度）定义的透视投影。
///
/// D3D 风格裁剪空间（`[2][3] = -1`，深度范围 far/(near-far)），
/// 与 [`create_view_matrix`] 的约定配套使用，不做 GL 的 z 翻转。
pub fn create_perspective_fov(fov_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let cos_fov = (0.5 * fov_deg * TO_RAD).cos();
    let sin_fov = (0.5 * fov_deg * TO_RAD).sin();

    let height = cos_fov / sin_fov;
    let width = height / aspect;
    let range = far / (near - far);

    [
        [width, 0.0, 0.0, 0.0],
        [0.0, height, 0.0, 0.0],
        [0.0, 0.0, range, -1.0],
        [0.0, 0.0, range * near, 0.0],
    ]
}

/// 仅平移的世界矩阵（场景中摆放的模型只存位置）。
pub fn create_translation(position: [f32; 3]) -> Mat4 {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [position[0], position[1], position[2], 1.0],
    ]
}

/// 行向量约定的矩阵乘法：组合变换先作用 `a`，再作用 `b`。
pub fn mul_matrix(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut out = [[0.0f32; 4]; 4];
    for row in 0..4 {
        for col in 0..4 {
            out[row][col] = a[row][0] * b[0][col]
                + a[row][1] * b[1][col]
                + a[row][2] * b[2][col]
                + a[row][3] * b[3][col];
        }
    }
    out
}

/// 展平成上传 glUniformMatrix4fv 所需的 16 个连续浮点。
pub fn flatten(m: &Mat4) -> [f32; 16] {
    let mut out = [0.0f32; 16];
    for row in 0..4 {
        for col in 0..4 {
            out[row * 4 + col] = m[row][col];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn basis(m: &Mat4) -> ([f32; 3], [f32; 3], [f32; 3]) {
        // 基向量存在矩阵的列里（行向量约定）
        let r0 = [m[0][0], m[1][0], m[2][0]];
        let r1 = [m[0][1], m[1][1], m[2][1]];
        let r2 = [m[0][2], m[1][2], m[2][2]];
        (r0, r1, r2)
    }

    fn dot(a: &[f32; 3], b: &[f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn view_matrix_basis_is_orthonormal() {
        for pitch in [-89.0f32, -45.0, -1.0, 0.0, 30.0, 60.0, 89.0] {
            for yaw in [0.0f32, 45.0, 90.0, 135.0, 222.5, 359.0] {
                let m = create_view_matrix([1.0, -2.0, 3.0], pitch, yaw);
                let (r0, r1, r2) = basis(&m);
                assert!((dot(&r0, &r0) - 1.0).abs() < EPS, "pitch={pitch} yaw={yaw}");
                assert!((dot(&r1, &r1) - 1.0).abs() < EPS, "pitch={pitch} yaw={yaw}");
                assert!((dot(&r2, &r2) - 1.0).abs() < EPS, "pitch={pitch} yaw={yaw}");
                assert!(dot(&r0, &r1).abs() < EPS, "pitch={pitch} yaw={yaw}");
                assert!(dot(&r1, &r2).abs() < EPS, "pitch={pitch} yaw={yaw}");
                assert!(dot(&r0, &r2).abs() < EPS, "pitch={pitch} yaw={yaw}");
            }
        }
    }

    #[test]
    fn view_matrix_identity_orientation() {
        // 偏航 0、俯仰 0：朝 +Y 看，右 = +X，上 = +Z
        let m = create_view_matrix([0.0, 0.0, 0.0], 0.0, 0.0);
        let (r0, r1, r2) = basis(&m);
        assert!(dot(&r0, &[1.0, 0.0, 0.0]) > 1.0 - EPS);
        assert!(dot(&r1, &[0.0, 0.0, 1.0]) > 1.0 - EPS);
        // 背向量指向 -Y
        assert!(dot(&r2, &[0.0, -1.0, 0.0]) > 1.0 - EPS);
        // 位置在原点时没有平移
        assert!(m[3][0].abs() < EPS && m[3][1].abs() < EPS && m[3][2].abs() < EPS);
    }

    #[test]
    fn perspective_matrix_shape() {
        let m = create_perspective_fov(90.0, 2.0, 0.1, 1000.0);
        // fov 90° → height = 1，width = height / aspect
        assert!((m[1][1] - 1.0).abs() < EPS);
        assert!((m[0][0] - 0.5).abs() < EPS);
        assert!((m[2][3] + 1.0).abs() < EPS);
        let range = 1000.0 / (0.1 - 1000.0);
        assert!((m[2][2] - range).abs() < EPS);
        assert!((m[3][2] - range * 0.1).abs() < 1e-3);
        assert!(m[3][3].abs() < EPS);
    }

    #[test]
    fn mul_matrix_applies_left_operand_first() {
        let scale = [
            [2.0, 0.0, 0.0, 0.0],
            [0.0, 2.0, 0.0, 0.0],
            [0.0, 0.0, 2.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ];
        let translate = create_translation([1.0, 2.0, 3.0]);
        let combined = mul_matrix(&scale, &translate);

        // 行向量 p = (1, 0, 0, 1)：先缩放到 (2,0,0)，再平移到 (3,2,3)
        let p = [1.0f32, 0.0, 0.0, 1.0];
        let mut out = [0.0f32; 4];
        for col in 0..4 {
            for row in 0..4 {
                out[col] += p[row] * combined[row][col];
            }
        }
        assert!((out[0] - 3.0).abs() < EPS);
        assert!((out[1] - 2.0).abs() < EPS);
        assert!((out[2] - 3.0).abs() < EPS);
    }
}

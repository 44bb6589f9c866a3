//! # 视口相机模型
//!
//! 4 个逻辑视口（透视 / 顶视 / 左视 / 前视）各占一个槽位。槽位不
//! 永久绑定视口类型：每帧由布局模式重新指派（全屏模式只用槽位 0）。
//!
//! 所有可变状态集中在 [`ViewState`]：4 条相机记录 + 至多一个拖拽
//! 会话。拖拽会话是一把 1 槽锁——中键按下时哪个视口先拿到，哪个
//! 视口独占相机拖拽，直到中键抬起。

pub mod panel;

use egui::{Rect, pos2, vec2};

pub const MAX_VIEWS: usize = 4;

/// 离散缩放表。索引 8 = 1.0（1 像素 = 1 单位），索引 18 = 32.0 为
/// 正交视口默认档。
pub const ZOOM_LEVELS: [f32; 25] = [
    0.0625, 0.09375, 0.125, 0.1875, 0.25, 0.375, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0, 4.0, 6.0, 8.0,
    12.0, 16.0, 24.0, 32.0, 48.0, 64.0, 96.0, 128.0, 192.0, 256.0,
];

/// 鼠标位移 → 角度的比例
pub const LOOK_SCALE: f32 = 0.3;
/// 飞行移动速度（单位/秒）
pub const FLY_SPEED: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Perspective,
    Top,
    Left,
    Front,
}

impl ViewKind {
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Perspective => "Perspective",
            Self::Top => "Top",
            Self::Left => "Left",
            Self::Front => "Front",
        }
    }

    /// 文档 `editor.views` 下对应的键名
    pub fn settings_key(self) -> &'static str {
        match self {
            Self::Perspective => "perspective",
            Self::Top => "top",
            Self::Left => "left",
            Self::Front => "front",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewLayout {
    Four,
    Full,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewCamera {
    /// 世界坐标。正交视口只用 x/y 平移，透视视口三轴都用。
    pub position: [f32; 3],
    /// [`ZOOM_LEVELS`] 的下标，始终处于 [0, 24]
    pub zoom_level: i32,
    /// 俯仰（度），限制在 [-89, 89]，只有透视视口使用
    pub angle_x: f32,
    /// 偏航（度），回绕到 [0, 360)，只有透视视口使用
    pub angle_z: f32,
    /// 本帧解析出的视口类型
    pub kind: ViewKind,
    /// 上一次布局算出的屏幕矩形（逻辑点）
    pub rect: Rect,
}

impl ViewCamera {
    fn perspective_default() -> Self {
        Self {
            position: [-2.0, -2.0, 2.0],
            zoom_level: 15,
            angle_x: -30.0,
            angle_z: 45.0,
            kind: ViewKind::Perspective,
            rect: Rect::NOTHING,
        }
    }

    fn ortho_default(kind: ViewKind) -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            zoom_level: 18,
            angle_x: 0.0,
            angle_z: 0.0,
            kind,
            rect: Rect::NOTHING,
        }
    }

    /// 当前缩放因子（下标防御性钳制后查表）
    pub fn zoom(&self) -> f32 {
        ZOOM_LEVELS[self.zoom_level.clamp(0, ZOOM_LEVELS.len() as i32 - 1) as usize]
    }

    /// 返回档位是否真的变了（顶档再放大是 no-op）
    pub fn zoom_in(&mut self) -> bool {
        let old = self.zoom_level;
        self.zoom_level = (self.zoom_level + 1).min(ZOOM_LEVELS.len() as i32 - 1);
        self.zoom_level != old
    }

    pub fn zoom_out(&mut self) -> bool {
        let old = self.zoom_level;
        self.zoom_level = (self.zoom_level - 1).max(0);
        self.zoom_level != old
    }

    /// 鼠标位移（屏幕像素）转为偏航/俯仰增量
    pub fn apply_look_delta(&mut self, dx: f32, dy: f32) {
        self.angle_z = (self.angle_z + dx * LOOK_SCALE).rem_euclid(360.0);
        self.angle_x = (self.angle_x - dy * LOOK_SCALE).clamp(-89.0, 89.0);
    }

    /// 当前朝向的前向量（单位长度，Z 轴朝上）
    pub fn forward(&self) -> [f32; 3] {
        let (sin_z, cos_z) = self.angle_z.to_radians().sin_cos();
        let (sin_x, cos_x) = self.angle_x.to_radians().sin_cos();
        [sin_z * cos_x, cos_z * cos_x, sin_x]
    }

    /// 水平面内的右向量
    pub fn right(&self) -> [f32; 2] {
        let (sin_z, cos_z) = self.angle_z.to_radians().sin_cos();
        [cos_z, -sin_z]
    }

    /// 按住的移动键在本帧积分位置
    pub fn fly(&mut self, keys: &FlyKeys, dt: f32) {
        let step = FLY_SPEED * dt;
        let f = self.forward();
        let r = self.right();
        if keys.forward {
            self.position[0] += f[0] * step;
            self.position[1] += f[1] * step;
            self.position[2] += f[2] * step;
        }
        if keys.back {
            self.position[0] -= f[0] * step;
            self.position[1] -= f[1] * step;
            self.position[2] -= f[2] * step;
        }
        if keys.right {
            self.position[0] += r[0] * step;
            self.position[1] += r[1] * step;
        }
        if keys.left {
            self.position[0] -= r[0] * step;
            self.position[1] -= r[1] * step;
        }
        if keys.up {
            self.position[2] += step;
        }
        if keys.down {
            self.position[2] -= step;
        }
    }
}

/// 飞行模式下 6 个移动键的按住状态
#[derive(Debug, Clone, Copy, Default)]
pub struct FlyKeys {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl FlyKeys {
    pub fn any(&self) -> bool {
        self.forward || self.back || self.left || self.right || self.up || self.down
    }
}

/// 中键按下到抬起之间存在的拖拽会话
#[derive(Debug, Clone, Copy)]
pub struct DragSession {
    /// 持有会话的视口槽位
    pub view: usize,
    /// 按下瞬间的相机 x/y——正交平移每帧从这里重算，丢帧也不漂移
    pub start_position: [f32; 2],
}

pub struct ViewState {
    pub cameras: [ViewCamera; MAX_VIEWS],
    pub dragging: Option<DragSession>,
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            cameras: [
                ViewCamera::perspective_default(),
                ViewCamera::ortho_default(ViewKind::Top),
                ViewCamera::ortho_default(ViewKind::Left),
                ViewCamera::ortho_default(ViewKind::Front),
            ],
            dragging: None,
        }
    }

    /// 恢复 4 条出厂默认记录
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn drag_owner(&self) -> Option<usize> {
        self.dragging.map(|session| session.view)
    }

    /// 尝试获取拖拽会话。已有会话时返回 false，不抢占。
    pub fn try_begin_drag(&mut self, view: usize) -> bool {
        if self.dragging.is_some() {
            return false;
        }
        let camera = &self.cameras[view];
        self.dragging = Some(DragSession {
            view,
            start_position: [camera.position[0], camera.position[1]],
        });
        true
    }

    /// 释放会话；只有持有者能释放
    pub fn end_drag(&mut self, view: usize) {
        if self.drag_owner() == Some(view) {
            self.dragging = None;
        }
    }

    /// 透视视口的飞行拖拽是否进行中（需要持续重绘）
    pub fn flying(&self) -> bool {
        self.drag_owner()
            .is_some_and(|view| self.cameras[view].kind == ViewKind::Perspective)
    }
}

/// 正交平移：屏幕位移按当前缩放换算回世界坐标，从拖拽起点重算
pub fn pan_from_drag(start: [f32; 2], drag_delta: [f32; 2], zoom: f32) -> [f32; 2] {
    [start[0] - drag_delta[0] / zoom, start[1] - drag_delta[1] / zoom]
}

/// 由可用区域 + 布局模式 + 槽位算出视口矩形。
/// 四分模式下槽位 0/1 在上排，2/3 在下排，奇数槽位在右列。
pub fn view_rect(avail: Rect, layout: ViewLayout, index: usize) -> Rect {
    match layout {
        ViewLayout::Full => avail,
        ViewLayout::Four => {
            let w = avail.width() / 2.0;
            let h = avail.height() / 2.0;
            let mut x = avail.left();
            let mut y = avail.top();
            if index & 1 == 1 {
                x += w;
            }
            if index >= 2 {
                y += h;
            }
            Rect::from_min_size(pos2(x, y), vec2(w, h))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zoom_level_stays_clamped() {
        let mut camera = ViewCamera::ortho_default(ViewKind::Top);
        for _ in 0..40 {
            camera.zoom_in();
        }
        assert_eq!(camera.zoom_level, 24);
        assert!(!camera.zoom_in());
        for _ in 0..80 {
            camera.zoom_out();
        }
        assert_eq!(camera.zoom_level, 0);
        assert!(!camera.zoom_out());
        assert!(camera.zoom_in());
        assert_eq!(camera.zoom_level, 1);
    }

    #[test]
    fn pitch_clamped_yaw_wrapped() {
        let mut camera = ViewCamera::perspective_default();
        for _ in 0..100 {
            camera.apply_look_delta(40.0, -40.0);
        }
        assert!(camera.angle_x <= 89.0);
        assert!((0.0..360.0).contains(&camera.angle_z));

        for _ in 0..200 {
            camera.apply_look_delta(-40.0, 40.0);
        }
        assert!(camera.angle_x >= -89.0);
        assert!((0.0..360.0).contains(&camera.angle_z));
    }

    #[test]
    fn drag_session_has_single_owner() {
        let mut state = ViewState::new();
        assert!(state.try_begin_drag(0));
        // B 视口无法抢占，A 的会话保持不变
        assert!(!state.try_begin_drag(1));
        assert_eq!(state.drag_owner(), Some(0));
        // 非持有者的释放是 no-op
        state.end_drag(1);
        assert_eq!(state.drag_owner(), Some(0));
        state.end_drag(0);
        assert_eq!(state.drag_owner(), None);
        // A 释放后 B 才能获取
        assert!(state.try_begin_drag(1));
    }

    #[test]
    fn ortho_pan_round_trip() {
        // 从 (10,10) 起，18 档（32.0），拖 (32,64) → (9, 8)
        let zoom = ZOOM_LEVELS[18];
        assert_eq!(zoom, 32.0);
        let result = pan_from_drag([10.0, 10.0], [32.0, 64.0], zoom);
        assert_eq!(result, [9.0, 8.0]);
    }

    #[test]
    fn fly_moves_along_forward() {
        let mut camera = ViewCamera::ortho_default(ViewKind::Top);
        camera.kind = ViewKind::Perspective;
        camera.angle_x = 0.0;
        camera.angle_z = 0.0;
        let keys = FlyKeys {
            forward: true,
            ..Default::default()
        };
        camera.fly(&keys, 1.0);
        // 偏航 0 朝 +Y，一秒走 FLY_SPEED
        assert!((camera.position[1] - FLY_SPEED).abs() < 1e-4);
        assert!(camera.position[0].abs() < 1e-4);
        assert!(camera.position[2].abs() < 1e-4);
    }

    #[test]
    fn four_up_layout_quarters_by_slot() {
        let avail = Rect::from_min_size(pos2(240.0, 52.0), vec2(800.0, 600.0));
        let top_left = view_rect(avail, ViewLayout::Four, 0);
        let top_right = view_rect(avail, ViewLayout::Four, 1);
        let bottom_left = view_rect(avail, ViewLayout::Four, 2);
        let bottom_right = view_rect(avail, ViewLayout::Four, 3);

        assert_eq!(top_left.min, pos2(240.0, 52.0));
        assert_eq!(top_right.min, pos2(640.0, 52.0));
        assert_eq!(bottom_left.min, pos2(240.0, 352.0));
        assert_eq!(bottom_right.min, pos2(640.0, 352.0));
        for rect in [top_left, top_right, bottom_left, bottom_right] {
            assert_eq!(rect.size(), vec2(400.0, 300.0));
        }

        assert_eq!(view_rect(avail, ViewLayout::Full, 0), avail);
    }

    #[test]
    fn factory_defaults() {
        let state = ViewState::new();
        assert_eq!(state.cameras[0].position, [-2.0, -2.0, 2.0]);
        assert_eq!(state.cameras[0].zoom_level, 15);
        assert_eq!(state.cameras[0].angle_x, -30.0);
        assert_eq!(state.cameras[0].angle_z, 45.0);
        for camera in &state.cameras[1..] {
            assert_eq!(camera.position, [0.0, 0.0, 0.0]);
            assert_eq!(camera.zoom_level, 18);
        }
    }
}
